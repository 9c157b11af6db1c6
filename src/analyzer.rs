use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::AnalysisParams;
use crate::error::Result;
use crate::pose::{FramePose, LandmarkDetector, PoseDetector};
use crate::video::{OpenCvSource, VideoMetadata, VideoSource};

/// 出力スキーマのバージョン
pub const SCHEMA_VERSION: u32 = 1;

// --- データ構造 ---

/// フレーム単位の解析レコード
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    /// 0起点の連番フレームID
    pub frame_id: u64,
    /// frame_id / fps 秒。fps が 0 以下なら 0
    pub timestamp: f64,
    pub pose: FramePose,
}

/// フレーム列の末尾サマリー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_frames: usize,
    /// 最終フレームのタイムスタンプ（秒）。フレームがなければ 0
    pub duration: f64,
}

impl AnalysisSummary {
    fn from_frames(frames: &[FrameRecord]) -> Self {
        Self {
            total_frames: frames.len(),
            duration: frames.last().map_or(0.0, |f| f.timestamp),
        }
    }
}

/// 1本の動画に対する解析結果全体
///
/// `analyze` 呼び出しごとに1つ構築され、返却後は不変。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub schema_version: u32,
    pub metadata: VideoMetadata,
    pub frames: Vec<FrameRecord>,
    pub summary: AnalysisSummary,
}

impl AnalysisResult {
    /// 整形済みJSON文字列に変換
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 整形済みJSONとしてファイルに保存
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

// --- オーケストレータ ---

/// 動画全体を解析するオーケストレータ
///
/// フレームを厳密に順番どおり読み、1フレームにつき1回だけ検出器を
/// 同期呼び出しし、レコード列とサマリーに積み上げる。
pub struct TennisAnalyzer<D> {
    detector: PoseDetector<D>,
}

impl<D: LandmarkDetector> TennisAnalyzer<D> {
    pub fn new(backend: D) -> Self {
        Self {
            detector: PoseDetector::new(backend),
        }
    }

    /// 動画ファイルを解析する
    ///
    /// ソースを開けない場合はフレーム処理に入る前に
    /// `SourceUnavailable` で失敗する。
    pub fn analyze(&mut self, path: &str, params: &AnalysisParams) -> Result<AnalysisResult> {
        let source = OpenCvSource::open(path)?;
        self.analyze_source(source, params)
    }

    /// 開いた映像ソースを解析する
    ///
    /// ソースは値で受け取るため、正常終了でも途中エラーでも
    /// この関数を抜けた時点でハンドルが解放される。
    pub fn analyze_source<S: VideoSource>(
        &mut self,
        mut source: S,
        params: &AnalysisParams,
    ) -> Result<AnalysisResult> {
        // roi / player_side は受け付けるが現在のフレーム処理では参照しない
        tracing::debug!(?params, "analysis params accepted");

        let metadata = source.metadata();
        tracing::info!(
            width = metadata.width,
            height = metadata.height,
            fps = metadata.fps,
            frame_count = metadata.frame_count,
            "video source opened"
        );

        let mut frames = Vec::new();
        let mut frame_id: u64 = 0;

        while let Some(frame) = source.read_frame() {
            let pose = self.detector.detect(&frame)?;
            tracing::trace!(frame_id, detected = pose.detected, "frame processed");

            frames.push(FrameRecord {
                frame_id,
                timestamp: metadata.frame_timestamp(frame_id),
                pose,
            });
            frame_id += 1;
        }

        let summary = AnalysisSummary::from_frames(&frames);
        tracing::info!(
            total_frames = summary.total_frames,
            duration = summary.duration,
            "analysis finished"
        );

        Ok(AnalysisResult {
            schema_version: SCHEMA_VERSION,
            metadata,
            frames,
            summary,
        })
    }
}
