use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::keypoint::{find_keypoint, Keypoint, LandmarkIndex};
use crate::geometry::{angle_at_vertex, angle_between_vectors};

/// 導出する関節角度の種類
///
/// 宣言順がそのまま出力マッピングの並び順になる。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AngleKind {
    RightElbow,
    LeftElbow,
    RightKnee,
    LeftKnee,
    ShoulderRotation,
}

impl AngleKind {
    /// 表示用の名前
    pub fn name(&self) -> &'static str {
        match self {
            Self::RightElbow => "right_elbow",
            Self::LeftElbow => "left_elbow",
            Self::RightKnee => "right_knee",
            Self::LeftKnee => "left_knee",
            Self::ShoulderRotation => "shoulder_rotation",
        }
    }
}

/// 関節角度の3点定義: (角度名, [起点, 頂点, 終点])
const JOINT_TRIPLES: [(AngleKind, [LandmarkIndex; 3]); 4] = [
    (
        AngleKind::RightElbow,
        [
            LandmarkIndex::RightShoulder,
            LandmarkIndex::RightElbow,
            LandmarkIndex::RightWrist,
        ],
    ),
    (
        AngleKind::LeftElbow,
        [
            LandmarkIndex::LeftShoulder,
            LandmarkIndex::LeftElbow,
            LandmarkIndex::LeftWrist,
        ],
    ),
    (
        AngleKind::RightKnee,
        [
            LandmarkIndex::RightHip,
            LandmarkIndex::RightKnee,
            LandmarkIndex::RightAnkle,
        ],
    ),
    (
        AngleKind::LeftKnee,
        [
            LandmarkIndex::LeftHip,
            LandmarkIndex::LeftKnee,
            LandmarkIndex::LeftAnkle,
        ],
    ),
];

/// 肩の回転角の基準にする水平単位ベクトル
const HORIZONTAL: (f32, f32) = (1.0, 0.0);

/// 名前付き関節角度のマッピング（度数）
///
/// 計算に必要なキーポイントが揃っていた角度だけがエントリを持つ。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleSet(BTreeMap<AngleKind, f32>);

impl AngleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: AngleKind, degrees: f32) {
        self.0.insert(kind, degrees);
    }

    pub fn get(&self, kind: AngleKind) -> Option<f32> {
        self.0.get(&kind).copied()
    }

    pub fn contains(&self, kind: AngleKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AngleKind, f32)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

/// キーポイント列から関節角度を導出する
///
/// 角度計算は 2D (x, y) のみで行い、z と visibility は参照しない。
/// 必要なキーポイントが見つからない角度は出力から除外する（エラーにしない）。
pub fn derive_angles(keypoints: &[Keypoint]) -> AngleSet {
    let mut angles = AngleSet::new();

    let point = |name: LandmarkIndex| find_keypoint(keypoints, name).map(|kp| kp.position());

    for (kind, [start, vertex, end]) in JOINT_TRIPLES {
        if let (Some(p1), Some(p2), Some(p3)) = (point(start), point(vertex), point(end)) {
            angles.insert(kind, angle_at_vertex(p1, p2, p3));
        }
    }

    // 肩の回転: 左肩から右肩へのベクトルと水平線のなす角
    if let (Some(left), Some(right)) = (
        point(LandmarkIndex::LeftShoulder),
        point(LandmarkIndex::RightShoulder),
    ) {
        let shoulder_vec = (right.0 - left.0, right.1 - left.1);
        angles.insert(
            AngleKind::ShoulderRotation,
            angle_between_vectors(shoulder_vec, HORIZONTAL),
        );
    }

    angles
}
