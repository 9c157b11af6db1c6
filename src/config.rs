use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub analysis: AnalysisParams,
}

/// 姿勢ランドマークモデルの設定
#[derive(Debug, Deserialize, Clone)]
pub struct DetectorConfig {
    /// ONNXモデルのパス
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// 姿勢スコアの閾値。これ未満のフレームは未検出扱い
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
}

fn default_model_path() -> String {
    "models/pose_landmark_full.onnx".to_string()
}
fn default_score_threshold() -> f32 {
    0.5
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            score_threshold: default_score_threshold(),
        }
    }
}

/// 解析パラメータ
///
/// roi と player_side は受け付けるが現在のフレーム処理では参照しない。
/// 将来の拡張ポイントとして設定面だけ残している。
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AnalysisParams {
    /// 注目領域 [x1, y1, x2, y2]（フレームに対する割合）
    #[serde(default)]
    pub roi: Option<[f32; 4]>,
    /// 選手のコートサイド
    #[serde(default)]
    pub player_side: Option<PlayerSide>,
}

/// 選手がコートのどちら側か
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSide {
    Left,
    Right,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 設定ファイルが読めなければ既定値で動かす
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("config load failed ({}), using defaults", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.detector.model_path, "models/pose_landmark_full.onnx");
        assert_eq!(config.detector.score_threshold, 0.5);
        assert!(config.analysis.roi.is_none());
        assert!(config.analysis.player_side.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [detector]
            model_path = "models/custom.onnx"
            score_threshold = 0.7

            [analysis]
            roi = [0.1, 0.2, 0.9, 0.8]
            player_side = "left"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.detector.model_path, "models/custom.onnx");
        assert_eq!(config.detector.score_threshold, 0.7);
        assert_eq!(config.analysis.roi, Some([0.1, 0.2, 0.9, 0.8]));
        assert_eq!(config.analysis.player_side, Some(PlayerSide::Left));
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let toml_str = r#"
            [detector]
            score_threshold = 0.3
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.detector.model_path, "models/pose_landmark_full.onnx");
        assert_eq!(config.detector.score_threshold, 0.3);
        assert!(config.analysis.player_side.is_none());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/config.toml");
        assert_eq!(config.detector.score_threshold, 0.5);
    }
}
