use anyhow::Result;
use std::env;

use swing_mind::analyzer::TennisAnalyzer;
use swing_mind::config::Config;
use swing_mind::pose::OnnxPoseModel;

const CONFIG_PATH: &str = "config.toml";

/// 既定の結果出力パス
const DEFAULT_OUTPUT: &str = "result.json";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("swing_mind=info,ort=warn")
        .init();

    let args: Vec<String> = env::args().collect();
    let video_path = match args.get(1) {
        Some(path) => path.clone(),
        None => {
            println!("使い方: swing-mind <動画ファイル> [出力JSON]");
            println!("  例: swing-mind rally.mp4 result.json");
            std::process::exit(1)
        }
    };
    let output_path = args
        .get(2)
        .map(String::as_str)
        .unwrap_or(DEFAULT_OUTPUT)
        .to_string();

    println!("=== Swing Mind ({}) ===", env!("GIT_VERSION"));

    let config = Config::load_or_default(CONFIG_PATH);

    println!("[1/3] モデルを読み込み中: {}", config.detector.model_path);
    let backend = OnnxPoseModel::from_config(&config.detector)?;
    let mut analyzer = TennisAnalyzer::new(backend);

    println!("[2/3] 解析中: {}", video_path);
    let result = analyzer.analyze(&video_path, &config.analysis)?;

    println!("[3/3] 結果を保存中: {}", output_path);
    result.save(&output_path)?;

    println!();
    println!("=== 解析結果 ===");
    println!(
        "解像度: {}x{}",
        result.metadata.width, result.metadata.height
    );
    println!("FPS: {:.2}", result.metadata.fps);
    println!("総フレーム数: {}", result.summary.total_frames);
    println!("再生時間: {:.2}秒", result.summary.duration);

    let detected = result.frames.iter().filter(|f| f.pose.detected).count();
    println!(
        "姿勢を検出したフレーム: {}/{}",
        detected, result.summary.total_frames
    );

    // 最初に検出できたフレームの関節角度を表示
    if let Some(first) = result.frames.iter().find(|f| f.pose.detected) {
        println!();
        println!("フレーム {} の関節角度:", first.frame_id);
        for (kind, degrees) in first.pose.angles.iter() {
            println!("  {}: {:.1} deg", kind.name(), degrees);
        }
    }

    Ok(())
}
