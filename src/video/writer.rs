use opencv::{
    core::Size,
    prelude::*,
    videoio::VideoWriter,
};

use crate::error::{Error, Result};

/// 既定の出力コーデック
pub const DEFAULT_FOURCC: &str = "mp4v";

/// fourcc文字列をOpenCVのコーデック値に変換
pub fn fourcc_code(fourcc: &str) -> Result<i32> {
    let chars: Vec<char> = fourcc.chars().collect();
    if chars.len() != 4 {
        return Err(Error::InvalidFourcc(fourcc.to_string()));
    }
    Ok(VideoWriter::fourcc(chars[0], chars[1], chars[2], chars[3])?)
}

/// 注釈付きフレームを書き出す動画ライターを開く
pub fn open_writer(
    path: &str,
    width: u32,
    height: u32,
    fps: f64,
    fourcc: &str,
) -> Result<VideoWriter> {
    let code = fourcc_code(fourcc)?;
    let writer = VideoWriter::new(
        path,
        code,
        fps,
        Size::new(width as i32, height as i32),
        true,
    )?;

    if !writer.is_opened()? {
        return Err(Error::WriterUnavailable(path.to_string()));
    }

    Ok(writer)
}
