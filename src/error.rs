use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImatError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("ラベルマップが不正: {0}")]
    LabelMap(String),

    #[error("splitファイルが不正: {0}")]
    SplitFile(String),

    #[error("ウェアハウスエラー: {0}")]
    Warehouse(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] imat_common::Error),
}

pub type Result<T> = std::result::Result<T, ImatError>;
