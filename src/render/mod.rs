pub mod overlay;
pub mod window;

pub use overlay::{draw_pose, VISIBILITY_THRESHOLD};
pub use window::PreviewWindow;
