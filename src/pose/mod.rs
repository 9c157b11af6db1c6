pub mod angles;
pub mod detector;
pub mod keypoint;
pub mod preprocess;

pub use angles::{derive_angles, AngleKind, AngleSet};
pub use detector::{LandmarkDetector, OnnxPoseModel, PoseDetector};
pub use keypoint::{
    extract_keypoints, find_keypoint, FramePose, Keypoint, LandmarkIndex, NormalizedLandmark,
};
pub use preprocess::{preprocess_for_blazepose, BLAZEPOSE_INPUT_SIZE};
