//! テーブル行の型定義
//!
//! rawスキーマ（ローダーが書き込む）と、モデルが生成する派生リレーションの行型:
//! - LabelMapRow / AnnotationRow / ImageRow / SplitInfoRow / SplitLicenseRow: raw
//! - MaterialRow: stg_imat_material
//! - AnnotationLabelRow: stg_imat_annotation_labels
//! - ImageMaterialRow: int_imat_image_material
//!
//! フィールド名はそのままカラム名になる（snake_case）。

use serde::{Deserialize, Serialize};

/// raw.imat_label_map の行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMapRow {
    pub label_id: i32,
    pub task_id: i32,
    pub label_name: String,
    pub task_name: String,
}

/// raw.imat_annotations の行
///
/// `label_ids` は受け取ったJSONのまま保持する（データセットでは `["95","66"]` のような文字列配列）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRow {
    pub split: String,
    pub image_id: i64,
    pub label_ids: serde_json::Value,
}

/// raw.imat_images の行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRow {
    pub split: String,
    pub image_id: i64,
    pub url: String,
}

/// raw.imat_info の行（splitごとに最大1行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitInfoRow {
    pub split: String,
    pub info: serde_json::Value,
}

/// raw.imat_license の行（splitごとに最大1行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitLicenseRow {
    pub split: String,
    pub license: serde_json::Value,
}

/// stg_imat_material の行
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialRow {
    pub label_id: i32,
    pub material_name: String,
}

/// stg_imat_annotation_labels の行
///
/// 配列要素が JSON の null なら `label_id` も NULL（`None`）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationLabelRow {
    pub split: String,
    pub image_id: i64,
    pub label_id: Option<i32>,
}

/// int_imat_image_material の行
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageMaterialRow {
    pub split: String,
    pub image_id: i64,
    pub material_id: i32,
    pub material_name: String,
}

/// splitを持つ行（split単位の置き換えに使う）
pub trait SplitRow {
    fn split(&self) -> &str;
}

impl SplitRow for AnnotationRow {
    fn split(&self) -> &str { &self.split }
}

impl SplitRow for ImageRow {
    fn split(&self) -> &str { &self.split }
}

impl SplitRow for SplitInfoRow {
    fn split(&self) -> &str { &self.split }
}

impl SplitRow for SplitLicenseRow {
    fn split(&self) -> &str { &self.split }
}
