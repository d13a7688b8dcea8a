use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssessError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("解析サービスのURLが設定されていません。`car-assess config --set-analyzer-url URL` で設定してください")]
    MissingAnalyzerUrl,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("解析サービス呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("解析結果のパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("検出器の実行エラー: {0}")]
    CliExecution(String),

    #[error(transparent)]
    Common(#[from] car_assess_common::Error),
}

pub type Result<T> = std::result::Result<T, AssessError>;
