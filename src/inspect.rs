//! splitファイルの中身を確認する

use crate::error::{ImatError, Result};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// splitファイルの概要
#[derive(Debug, Clone, Default)]
pub struct SplitSummary {
    pub keys: Vec<String>,
    pub image_count: usize,
    pub annotation_count: usize,
    pub first_image: Option<Value>,
    pub first_annotation: Option<Value>,
    pub info: Option<Value>,
    pub license: Option<Value>,
}

pub fn summarize_split(json_path: &Path) -> Result<SplitSummary> {
    if !json_path.exists() {
        return Err(ImatError::FileNotFound(json_path.display().to_string()));
    }

    let reader = BufReader::new(File::open(json_path)?);
    let data: Value = serde_json::from_reader(reader)?;
    let object = data
        .as_object()
        .ok_or_else(|| ImatError::SplitFile(format!("トップレベルがオブジェクトではありません: {}", json_path.display())))?;

    let array = |key: &str| object.get(key).and_then(Value::as_array);

    Ok(SplitSummary {
        keys: object.keys().cloned().collect(),
        image_count: array("images").map_or(0, Vec::len),
        annotation_count: array("annotations").map_or(0, Vec::len),
        first_image: array("images").and_then(|a| a.first()).cloned(),
        first_annotation: array("annotations").and_then(|a| a.first()).cloned(),
        info: object.get("info").cloned(),
        license: object.get("license").cloned(),
    })
}

pub fn print_summary(summary: &SplitSummary) {
    let show = |value: &Option<Value>| match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    };

    println!("キー: {}", summary.keys.join(", "));
    println!("画像数: {}", summary.image_count);
    println!("アノテーション数: {}", summary.annotation_count);
    println!("最初のアノテーション: {}", show(&summary.first_annotation));
    println!("最初の画像: {}", show(&summary.first_image));
    println!("info: {}", show(&summary.info));
    println!("license: {}", show(&summary.license));
}
