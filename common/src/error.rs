//! エラー型定義

use thiserror::Error;

/// モデル評価時のエラー
#[derive(Error, Debug)]
pub enum Error {
    /// label_ids の要素が整数に変換できない
    #[error("invalid input syntax for integer: {value} (split={split}, image_id={image_id})")]
    Cast {
        split: String,
        image_id: i64,
        value: String,
    },

    /// label_ids が配列ではない
    #[error("cannot extract elements from a non-array label_ids (split={split}, image_id={image_id})")]
    NotAnArray { split: String, image_id: i64 },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_message_names_row_and_value() {
        let error = Error::Cast {
            split: "train".to_string(),
            image_id: 42,
            value: "\"abc\"".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("invalid input syntax for integer"));
        assert!(display.contains("\"abc\""));
        assert!(display.contains("split=train"));
        assert!(display.contains("image_id=42"));
    }

    #[test]
    fn test_not_an_array_message() {
        let error = Error::NotAnArray {
            split: "validation".to_string(),
            image_id: 7,
        };
        let display = format!("{}", error);
        assert!(display.contains("non-array"));
        assert!(display.contains("image_id=7"));
    }
}
