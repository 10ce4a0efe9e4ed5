use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoodAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像ファイルが空です: {0}")]
    EmptyImage(String),

    #[error("画像デコードエラー: {0}")]
    ImageDecode(String),

    #[error("モデル読み込みエラー: {0}")]
    ModelLoad(String),

    #[error("分類エラー: {0}")]
    Classification(String),

    #[error("対話入力エラー: {0}")]
    Interactive(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] food_ai_common::Error),
}

impl FoodAiError {
    /// 再試行（別の画像）で回復できるか
    ///
    /// モデル読み込み失敗はセッション中は致命的（再読み込みまで分類不可）
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FoodAiError::ModelLoad(_))
    }

    /// ユーザー向けステータス文言
    pub fn status_message(&self) -> String {
        match self {
            FoodAiError::ModelLoad(_) => "模型加载失败，请重新启动后再试。".to_string(),
            FoodAiError::EmptyImage(_) => "图片文件为空，请重新选择。".to_string(),
            FoodAiError::ImageDecode(_) | FoodAiError::FileNotFound(_) => {
                "图片无法读取，请换一张图片。".to_string()
            }
            FoodAiError::Classification(_) => "识别失败，请换一张图片重试。".to_string(),
            other => format!("发生错误：{}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, FoodAiError>;
