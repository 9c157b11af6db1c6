use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureAPIs},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// コンテナレベルの動画メタデータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    /// フレームレート。不明なら 0
    pub fps: f64,
    pub frame_count: u64,
    /// 総再生時間（秒）。fps が 0 以下なら 0
    pub duration: f64,
}

impl VideoMetadata {
    pub fn new(width: u32, height: u32, fps: f64, frame_count: u64) -> Self {
        let duration = if fps > 0.0 {
            frame_count as f64 / fps
        } else {
            0.0
        };
        Self {
            width,
            height,
            fps,
            frame_count,
            duration,
        }
    }

    /// フレームIDに対応するタイムスタンプ（秒）
    ///
    /// fps が 0 以下なら 0 と定義する。
    pub fn frame_timestamp(&self, frame_id: u64) -> f64 {
        if self.fps > 0.0 {
            frame_id as f64 / self.fps
        } else {
            0.0
        }
    }
}

/// フレームを順番に供給する映像ソースの抽象化
///
/// `read_frame` の None は終端または読み取り失敗を意味し、どちらも
/// 正常なストリーム終了として扱う。シークやスキップは提供しない。
pub trait VideoSource {
    fn metadata(&self) -> VideoMetadata;
    fn read_frame(&mut self) -> Option<Mat>;
}

/// OpenCV VideoCapture による映像ソース
///
/// 動画ファイルとカメラデバイスの両方を開ける。メタデータはオープン時に
/// 一度だけ取得する。ハンドルは drop 時に解放される。
pub struct OpenCvSource {
    capture: VideoCapture,
    metadata: VideoMetadata,
}

impl OpenCvSource {
    /// 動画ファイルを開く
    pub fn open(path: &str) -> Result<Self> {
        let capture = VideoCapture::from_file(path, VideoCaptureAPIs::CAP_ANY as i32)?;
        Self::wrap(capture, path)
    }

    /// カメラデバイスを開く
    pub fn open_device(index: i32) -> Result<Self> {
        let capture = VideoCapture::new(index, VideoCaptureAPIs::CAP_ANY as i32)?;
        Self::wrap(capture, &format!("camera {}", index))
    }

    fn wrap(capture: VideoCapture, name: &str) -> Result<Self> {
        if !capture.is_opened()? {
            return Err(Error::SourceUnavailable(name.to_string()));
        }

        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        // ライブカメラ等ではfpsやフレーム数が0や負値になる
        let fps = if fps.is_finite() { fps.max(0.0) } else { 0.0 };
        let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0) as u64;

        let metadata = VideoMetadata::new(width, height, fps, frame_count);
        Ok(Self { capture, metadata })
    }
}

impl VideoSource for OpenCvSource {
    fn metadata(&self) -> VideoMetadata {
        self.metadata.clone()
    }

    fn read_frame(&mut self) -> Option<Mat> {
        let mut frame = Mat::default();
        match self.capture.read(&mut frame) {
            Ok(true) if !frame.empty() => Some(frame),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("frame read failed, treating as end of stream: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_duration() {
        let metadata = VideoMetadata::new(1920, 1080, 30.0, 300);
        assert!((metadata.duration - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_metadata_duration_zero_fps() {
        let metadata = VideoMetadata::new(640, 480, 0.0, 300);
        assert_eq!(metadata.duration, 0.0);
    }

    #[test]
    fn test_frame_timestamp() {
        let metadata = VideoMetadata::new(640, 480, 30.0, 300);
        assert_eq!(metadata.frame_timestamp(0), 0.0);
        assert!((metadata.frame_timestamp(90) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_timestamp_zero_fps() {
        let metadata = VideoMetadata::new(640, 480, 0.0, 10);
        assert_eq!(metadata.frame_timestamp(5), 0.0);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let result = OpenCvSource::open("/nonexistent/missing_video.mp4");
        assert!(matches!(result, Err(Error::SourceUnavailable(_))));
    }
}
