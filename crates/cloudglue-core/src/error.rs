use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("属性ツリーの形が一致しません: {path} ({expected} が必要です)")]
    StructuralMismatch { path: String, expected: &'static str },

    #[error("{0}")]
    InvariantViolation(String),

    #[error("シリアライズエラー: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("スキーマエラー: {path}: {message}")]
    Schema { path: String, message: String },
}

impl MapperError {
    pub fn mismatch(path: impl Into<String>, expected: &'static str) -> Self {
        Self::StructuralMismatch {
            path: path.into(),
            expected,
        }
    }

    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;
