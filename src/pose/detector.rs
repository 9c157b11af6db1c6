use ndarray::ArrayViewD;
use opencv::core::Mat;
use opencv::prelude::*;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

use super::keypoint::{FramePose, LandmarkIndex, NormalizedLandmark};
use super::preprocess::{preprocess_for_blazepose, BLAZEPOSE_INPUT_SIZE};
use crate::config::DetectorConfig;
use crate::error::{Error, Result};

/// ランドマーク1点あたりの出力値数 (x, y, z, visibility, presence)
const LANDMARK_STRIDE: usize = 5;

/// 姿勢ランドマーク検出のバックエンド境界
///
/// 1フレームを受け取り、未検出なら None、検出できたら位置順の
/// 33 ランドマークを返す。呼び出しをまたぐ内部状態（トラッキング等）を
/// 持ってもよいが、その状態は実装側が所有する。
pub trait LandmarkDetector {
    fn detect_landmarks(
        &mut self,
        frame: &Mat,
    ) -> Result<Option<[NormalizedLandmark; LandmarkIndex::COUNT]>>;
}

/// MediaPipe Pose (BlazePose) 系 ONNX エクスポートを実行するバックエンド
///
/// 想定するモデル入出力:
/// - 入力 `input_1`: [1, 256, 256, 3] f32 RGB (0.0-1.0)
/// - 出力 `Identity`: 33 x 5 値のランドマーク
///   (x, y, z は入力ピクセル単位、visibility と presence はロジット)
/// - 出力 `Identity_1`: [1, 1] の姿勢スコア (0.0-1.0)
pub struct OnnxPoseModel {
    session: Session,
    score_threshold: f32,
}

impl OnnxPoseModel {
    /// ONNXモデルを読み込んで初期化
    pub fn new<P: AsRef<Path>>(model_path: P, score_threshold: f32) -> Result<Self> {
        let path = model_path.as_ref();
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(path)
            .map_err(|source| Error::ModelLoad {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Self {
            session,
            score_threshold,
        })
    }

    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        Self::new(&config.model_path, config.score_threshold)
    }
}

impl LandmarkDetector for OnnxPoseModel {
    fn detect_landmarks(
        &mut self,
        frame: &Mat,
    ) -> Result<Option<[NormalizedLandmark; LandmarkIndex::COUNT]>> {
        let input = preprocess_for_blazepose(frame)?;
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self.session.run(ort::inputs!["input_1" => input_tensor])?;

        // 姿勢スコアが閾値未満なら未検出扱い
        let score_out: ArrayViewD<f32> = outputs
            .get("Identity_1")
            .ok_or_else(|| Error::ModelOutput("missing output Identity_1".to_string()))?
            .try_extract_array()?;
        let score = score_out.iter().copied().next().unwrap_or(0.0);
        if score < self.score_threshold {
            return Ok(None);
        }

        let landmarks_out: ArrayViewD<f32> = outputs
            .get("Identity")
            .ok_or_else(|| Error::ModelOutput("missing output Identity".to_string()))?
            .try_extract_array()?;
        let values: Vec<f32> = landmarks_out.iter().copied().collect();
        Ok(Some(parse_landmarks(&values)?))
    }
}

/// 平坦な出力バッファを row-major 前提で読み、先頭 33 点を変換する
///
/// x, y, z は入力解像度で割り、visibility はロジットをシグモイドに通す。
/// 実モデルの出力は [1, 195] (33 + 補助 6 ランドマーク) だが、補助分は
/// 使わない。
fn parse_landmarks(values: &[f32]) -> Result<[NormalizedLandmark; LandmarkIndex::COUNT]> {
    if values.len() < LandmarkIndex::COUNT * LANDMARK_STRIDE {
        return Err(Error::ModelOutput(format!(
            "landmark tensor has {} values, expected at least {}",
            values.len(),
            LandmarkIndex::COUNT * LANDMARK_STRIDE
        )));
    }

    let size = BLAZEPOSE_INPUT_SIZE as f32;
    let mut landmarks = [NormalizedLandmark::default(); LandmarkIndex::COUNT];
    for (i, landmark) in landmarks.iter_mut().enumerate() {
        let base = i * LANDMARK_STRIDE;
        *landmark = NormalizedLandmark {
            x: values[base] / size,
            y: values[base + 1] / size,
            z: values[base + 2] / size,
            visibility: sigmoid(values[base + 3]),
        };
    }
    Ok(landmarks)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// フレームから `FramePose` を組み立てる検出器
///
/// バックエンドの生ランドマークをピクセル変換し、関節角度の導出まで行う。
/// 未検出フレームは detected=false かつ空の結果になる。
pub struct PoseDetector<D> {
    backend: D,
}

impl<D: LandmarkDetector> PoseDetector<D> {
    pub fn new(backend: D) -> Self {
        Self { backend }
    }

    /// 1フレームを同期的に検出
    pub fn detect(&mut self, frame: &Mat) -> Result<FramePose> {
        let width = frame.cols() as u32;
        let height = frame.rows() as u32;

        match self.backend.detect_landmarks(frame)? {
            Some(landmarks) => Ok(FramePose::from_landmarks(&landmarks, width, height)),
            None => Ok(FramePose::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::angles::AngleKind;
    use opencv::core::{Scalar, CV_8UC3};

    /// 台本どおりの結果を順に返すバックエンド
    struct ScriptedBackend {
        script: Vec<Option<[NormalizedLandmark; LandmarkIndex::COUNT]>>,
        calls: usize,
    }

    impl LandmarkDetector for ScriptedBackend {
        fn detect_landmarks(
            &mut self,
            _frame: &Mat,
        ) -> Result<Option<[NormalizedLandmark; LandmarkIndex::COUNT]>> {
            let item = self.script.get(self.calls).copied().flatten();
            self.calls += 1;
            Ok(item)
        }
    }

    fn uniform_landmarks() -> [NormalizedLandmark; LandmarkIndex::COUNT] {
        [NormalizedLandmark {
            x: 0.5,
            y: 0.5,
            z: -0.2,
            visibility: 1.0,
        }; LandmarkIndex::COUNT]
    }

    fn test_frame(width: i32, height: i32) -> Mat {
        Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }

    #[test]
    fn test_parse_landmarks_rejects_short_buffer() {
        let values = vec![0.0_f32; 10];
        assert!(matches!(
            parse_landmarks(&values),
            Err(Error::ModelOutput(_))
        ));
    }

    #[test]
    fn test_parse_landmarks_normalizes_and_squashes() {
        // 先頭 (nose) だけ既知の値、補助ランドマーク分を含む残りはゼロ埋め
        let mut values = vec![0.0_f32; 195];
        values[0] = 128.0;
        values[1] = 64.0;
        values[2] = -32.0;
        values[3] = 0.0;
        let landmarks = parse_landmarks(&values).unwrap();

        let nose = landmarks[LandmarkIndex::Nose as usize];
        assert!((nose.x - 0.5).abs() < 1e-6);
        assert!((nose.y - 0.25).abs() < 1e-6);
        assert!((nose.z + 0.125).abs() < 1e-6);
        assert!((nose.visibility - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_no_detection_yields_empty_result() {
        let backend = ScriptedBackend {
            script: vec![None],
            calls: 0,
        };
        let mut detector = PoseDetector::new(backend);

        let pose = detector.detect(&test_frame(640, 480)).unwrap();
        assert!(!pose.detected);
        assert!(pose.keypoints.is_empty());
        assert!(pose.angles.is_empty());
    }

    #[test]
    fn test_detection_scales_to_frame_pixels() {
        let backend = ScriptedBackend {
            script: vec![Some(uniform_landmarks())],
            calls: 0,
        };
        let mut detector = PoseDetector::new(backend);

        let pose = detector.detect(&test_frame(640, 480)).unwrap();
        assert!(pose.detected);
        assert_eq!(pose.keypoints.len(), LandmarkIndex::COUNT);

        let nose = pose.keypoint(LandmarkIndex::Nose).unwrap();
        assert_eq!(nose.x, 320.0);
        assert_eq!(nose.y, 240.0);
        assert_eq!(nose.z, -0.2);
    }

    #[test]
    fn test_detection_derives_angles() {
        // 全ランドマークが同一点なので角度は5つとも縮退値になるが、
        // キーは必ず揃う
        let backend = ScriptedBackend {
            script: vec![Some(uniform_landmarks())],
            calls: 0,
        };
        let mut detector = PoseDetector::new(backend);

        let pose = detector.detect(&test_frame(640, 480)).unwrap();
        assert_eq!(pose.angles.len(), 5);
        for (_, degrees) in pose.angles.iter() {
            assert!(!degrees.is_nan());
            assert!((0.0..=180.0).contains(&degrees));
        }
        assert!(pose.angles.contains(AngleKind::ShoulderRotation));
    }

    #[test]
    fn test_scripted_sequence() {
        let backend = ScriptedBackend {
            script: vec![Some(uniform_landmarks()), None, Some(uniform_landmarks())],
            calls: 0,
        };
        let mut detector = PoseDetector::new(backend);
        let frame = test_frame(100, 100);

        assert!(detector.detect(&frame).unwrap().detected);
        assert!(!detector.detect(&frame).unwrap().detected);
        assert!(detector.detect(&frame).unwrap().detected);
    }
}
