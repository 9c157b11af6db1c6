pub mod source;
pub mod writer;

pub use source::{OpenCvSource, VideoMetadata, VideoSource};
pub use writer::{fourcc_code, open_writer, DEFAULT_FOURCC};
