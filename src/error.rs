/// 解析パイプライン全体のエラー型
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 映像ソースを開けない（存在しないパス、壊れたファイル、未接続のカメラ）
    #[error("cannot open video source: {0}")]
    SourceUnavailable(String),

    /// 出力動画ライターを開けない
    #[error("cannot open video writer: {0}")]
    WriterUnavailable(String),

    /// ONNXモデルの読み込みに失敗
    #[error("failed to load pose model from {path}: {source}")]
    ModelLoad {
        path: String,
        #[source]
        source: ort::Error,
    },

    /// モデル出力が想定した形状でない
    #[error("unexpected model output: {0}")]
    ModelOutput(String),

    /// fourccは4文字でなければならない
    #[error("invalid fourcc (expected 4 characters): {0:?}")]
    InvalidFourcc(String),

    /// OpenCV呼び出しの失敗
    #[error("opencv error: {0}")]
    OpenCv(#[from] opencv::Error),

    /// ONNX Runtimeの実行時エラー
    #[error("onnx runtime error: {0}")]
    Ort(#[from] ort::Error),

    /// プレビューウィンドウのエラー
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    /// 結果のシリアライズに失敗
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// ファイル入出力の失敗
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
