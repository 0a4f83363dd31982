//! stg_imat_annotation_labels: label_ids 配列の展開
//!
//! 1アノテーション行を、配列要素ごとに1行へ展開する。
//! 要素はINTEGERへのキャストと同じ規則で変換する:
//! - JSON整数（i32範囲内）
//! - 前後の空白を除いて符号付き10進数として読める文字列（i32範囲内）
//!
//! null はキャストしても NULL なので、label_id が NULL の行になる。
//! それ以外（小数、真偽値、ネストした配列/オブジェクト、範囲外）はキャストエラー。

use crate::error::{Error, Result};
use crate::types::{AnnotationLabelRow, AnnotationRow};
use serde_json::Value;

/// 配列要素をラベルIDに変換（null は呼び出し側で扱う）
pub fn cast_label_id(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => {
            let trimmed = s.trim();
            let digits = trimmed.strip_prefix(&['+', '-'][..]).unwrap_or(trimmed);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            trimmed.parse::<i32>().ok()
        }
        _ => None,
    }
}

/// 1アノテーション行を展開
///
/// 空配列は0行。配列でない label_ids は [`Error::NotAnArray`]。
pub fn flatten_annotation(row: &AnnotationRow) -> Result<Vec<AnnotationLabelRow>> {
    let elements = row.label_ids.as_array().ok_or_else(|| Error::NotAnArray {
        split: row.split.clone(),
        image_id: row.image_id,
    })?;

    elements
        .iter()
        .map(|element| {
            let label_id = match element {
                Value::Null => None,
                _ => Some(cast_label_id(element).ok_or_else(|| Error::Cast {
                    split: row.split.clone(),
                    image_id: row.image_id,
                    value: element.to_string(),
                })?),
            };
            Ok(AnnotationLabelRow {
                split: row.split.clone(),
                image_id: row.image_id,
                label_id,
            })
        })
        .collect()
}

/// 全アノテーション行を展開（1件でも失敗したら全体がエラー）
pub fn stg_imat_annotation_labels(annotations: &[AnnotationRow]) -> Result<Vec<AnnotationLabelRow>> {
    let mut rows = Vec::new();
    for annotation in annotations {
        rows.extend(flatten_annotation(annotation)?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn annotation(split: &str, image_id: i64, label_ids: Value) -> AnnotationRow {
        AnnotationRow {
            split: split.to_string(),
            image_id,
            label_ids,
        }
    }

    #[test]
    fn test_cast_label_id_numbers_and_strings() {
        assert_eq!(cast_label_id(&json!(95)), Some(95));
        assert_eq!(cast_label_id(&json!("95")), Some(95));
        assert_eq!(cast_label_id(&json!(" 66 ")), Some(66));
        assert_eq!(cast_label_id(&json!("-3")), Some(-3));
        assert_eq!(cast_label_id(&json!("+4")), Some(4));
    }

    #[test]
    fn test_cast_label_id_rejects_non_integers() {
        assert_eq!(cast_label_id(&json!("abc")), None);
        assert_eq!(cast_label_id(&json!("")), None);
        assert_eq!(cast_label_id(&json!("-")), None);
        assert_eq!(cast_label_id(&json!("1.5")), None);
        assert_eq!(cast_label_id(&json!(1.5)), None);
        assert_eq!(cast_label_id(&json!(true)), None);
        assert_eq!(cast_label_id(&Value::Null), None);
        assert_eq!(cast_label_id(&json!([1])), None);
        assert_eq!(cast_label_id(&json!({"id": 1})), None);
    }

    #[test]
    fn test_cast_label_id_range() {
        assert_eq!(cast_label_id(&json!(2147483647)), Some(i32::MAX));
        assert_eq!(cast_label_id(&json!(2147483648_i64)), None);
        assert_eq!(cast_label_id(&json!("2147483648")), None);
    }

    #[test]
    fn test_flatten_produces_one_row_per_element() {
        let row = annotation("train", 1, json!(["95", "66", "66"]));
        let flattened = flatten_annotation(&row).unwrap();

        assert_eq!(flattened.len(), 3);
        assert!(flattened.iter().all(|r| r.split == "train" && r.image_id == 1));
        let ids: Vec<Option<i32>> = flattened.iter().map(|r| r.label_id).collect();
        assert_eq!(ids, vec![Some(95), Some(66), Some(66)]);
    }

    #[test]
    fn test_flatten_empty_array_yields_no_rows() {
        let row = annotation("train", 2, json!([]));
        assert!(flatten_annotation(&row).unwrap().is_empty());
    }

    #[test]
    fn test_flatten_null_element_yields_null_label() {
        let row = annotation("train", 5, json!(["5", null]));
        let flattened = flatten_annotation(&row).unwrap();

        let ids: Vec<Option<i32>> = flattened.iter().map(|r| r.label_id).collect();
        assert_eq!(ids, vec![Some(5), None]);
    }

    #[test]
    fn test_flatten_non_numeric_element_fails() {
        let row = annotation("validation", 3, json!(["12", "x"]));
        let err = flatten_annotation(&row).unwrap_err();
        match err {
            Error::Cast { split, image_id, value } => {
                assert_eq!(split, "validation");
                assert_eq!(image_id, 3);
                assert_eq!(value, "\"x\"");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_flatten_scalar_label_ids_fails() {
        let row = annotation("train", 4, json!("95"));
        assert!(matches!(
            flatten_annotation(&row),
            Err(Error::NotAnArray { image_id: 4, .. })
        ));
    }

    #[test]
    fn test_stg_preserves_annotation_order() {
        let annotations = vec![
            annotation("train", 10, json!(["1", "2"])),
            annotation("train", 11, json!([])),
            annotation("validation", 12, json!([3])),
        ];

        let rows = stg_imat_annotation_labels(&annotations).unwrap();
        let keys: Vec<(i64, Option<i32>)> = rows.iter().map(|r| (r.image_id, r.label_id)).collect();
        assert_eq!(keys, vec![(10, Some(1)), (10, Some(2)), (12, Some(3))]);
        assert_eq!(rows[2].split, "validation");
    }

    #[test]
    fn test_stg_fails_as_a_whole() {
        let annotations = vec![
            annotation("train", 10, json!(["1"])),
            annotation("train", 11, json!(["bad"])),
        ];
        assert!(stg_imat_annotation_labels(&annotations).is_err());
    }
}
