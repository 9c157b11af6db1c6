use anyhow::Result;
use opencv::prelude::*;
use std::env;

use swing_mind::config::Config;
use swing_mind::pose::{OnnxPoseModel, PoseDetector};
use swing_mind::render::{draw_pose, PreviewWindow};
use swing_mind::video::{open_writer, OpenCvSource, VideoSource, DEFAULT_FOURCC};

const CONFIG_PATH: &str = "config.toml";

/// ソースからfpsが取れない場合の録画フォールバック
const FALLBACK_FPS: f64 = 30.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("swing_mind=info,ort=warn")
        .init();

    let args: Vec<String> = env::args().collect();
    let source_arg = args.get(1).map(String::as_str).unwrap_or("0");
    let record_path = args.get(2).cloned();

    println!("Pose Demo ({})", env!("GIT_VERSION"));
    println!("ESCで終了");

    // 整数ならカメラ番号、それ以外はファイルパスとして開く
    println!("映像ソースを開いています: {}", source_arg);
    let mut source = match source_arg.parse::<i32>() {
        Ok(index) => OpenCvSource::open_device(index)?,
        Err(_) => OpenCvSource::open(source_arg)?,
    };
    let metadata = source.metadata();
    println!("解像度: {}x{}", metadata.width, metadata.height);

    let config = Config::load_or_default(CONFIG_PATH);
    println!("モデルを読み込んでいます: {}", config.detector.model_path);
    let backend = OnnxPoseModel::from_config(&config.detector)?;
    let mut detector = PoseDetector::new(backend);

    let mut writer = match &record_path {
        Some(path) => {
            let fps = if metadata.fps > 0.0 {
                metadata.fps
            } else {
                FALLBACK_FPS
            };
            println!("注釈付き動画を録画します: {}", path);
            Some(open_writer(
                path,
                metadata.width,
                metadata.height,
                fps,
                DEFAULT_FOURCC,
            )?)
        }
        None => None,
    };

    let mut window = PreviewWindow::new(
        "Pose Demo",
        metadata.width as usize,
        metadata.height as usize,
    )?;

    let mut frame_count = 0u64;
    let mut detected_count = 0u64;

    while window.is_open() {
        let frame = match source.read_frame() {
            Some(f) => f,
            None => break,
        };

        let pose = detector.detect(&frame)?;
        if pose.detected {
            detected_count += 1;
        }
        frame_count += 1;

        let annotated = draw_pose(&frame, &pose)?;
        if let Some(w) = writer.as_mut() {
            w.write(&annotated)?;
        }

        window.draw_frame(&annotated)?;
        window.update()?;
    }

    println!(
        "終了します（{}フレーム中{}フレームで姿勢を検出）",
        frame_count, detected_count
    );
    Ok(())
}
