pub mod analyzer;
pub mod config;
pub mod error;
pub mod geometry;
pub mod pose;
pub mod render;
pub mod video;
