use serde::{Deserialize, Serialize};

use super::angles::{derive_angles, AngleSet};

/// MediaPipe Pose 系モデルの 33 ランドマークインデックス
///
/// 並び順は検出器との外部契約であり変更不可。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    /// 位置順の全ランドマーク
    pub const ALL: [LandmarkIndex; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// 検出器が返す正規化ランドマーク
///
/// x, y はフレームに対する割合 (0.0〜1.0)。z は検出器の正規化単位の
/// 深度推定値。visibility は 0.0〜1.0。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

/// ピクセル座標に変換済みの単一キーポイント
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// ランドマークの位置インデックス
    pub id: u32,
    /// ランドマーク名（固定語彙）
    pub name: LandmarkIndex,
    /// X座標（ピクセル）
    pub x: f32,
    /// Y座標（ピクセル）
    pub y: f32,
    /// 深度推定値（検出器の正規化単位のまま）
    pub z: f32,
    /// 可視性スコア (0.0〜1.0)
    pub visibility: f32,
}

impl Keypoint {
    pub fn new(name: LandmarkIndex, x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            id: name as u32,
            name,
            x,
            y,
            z,
            visibility,
        }
    }

    /// 2D位置 (x, y)
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// 正規化ランドマーク列をピクセル座標のキーポイント列に変換
///
/// x, y はフレーム寸法でスケールし、z と visibility はそのまま通す。
/// 可視性によるフィルタは行わず、受け取った全エントリを出力する。
pub fn extract_keypoints(
    landmarks: &[NormalizedLandmark],
    width: u32,
    height: u32,
) -> Vec<Keypoint> {
    landmarks
        .iter()
        .zip(LandmarkIndex::ALL.iter())
        .map(|(lm, &name)| {
            Keypoint::new(
                name,
                lm.x * width as f32,
                lm.y * height as f32,
                lm.z,
                lm.visibility,
            )
        })
        .collect()
}

/// キーポイント列から名前で検索
///
/// 列が位置順であれば O(1)、そうでなければ線形走査にフォールバックする。
pub fn find_keypoint(keypoints: &[Keypoint], name: LandmarkIndex) -> Option<&Keypoint> {
    match keypoints.get(name as usize) {
        Some(kp) if kp.name == name => Some(kp),
        _ => keypoints.iter().find(|kp| kp.name == name),
    }
}

/// 1フレーム分の姿勢検出結果
///
/// 未検出 (detected == false) のときは keypoints と angles が必ず空。
/// 部分的な状態は存在しない。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FramePose {
    pub detected: bool,
    pub keypoints: Vec<Keypoint>,
    pub angles: AngleSet,
}

impl FramePose {
    /// 検出されたランドマークからフレーム結果を組み立てる
    ///
    /// ピクセル変換と関節角度の導出までまとめて行う。
    pub fn from_landmarks(landmarks: &[NormalizedLandmark], width: u32, height: u32) -> Self {
        let keypoints = extract_keypoints(landmarks, width, height);
        let angles = derive_angles(&keypoints);
        Self {
            detected: true,
            keypoints,
            angles,
        }
    }

    /// 名前でキーポイントを取得
    pub fn keypoint(&self, name: LandmarkIndex) -> Option<&Keypoint> {
        find_keypoint(&self.keypoints, name)
    }
}
