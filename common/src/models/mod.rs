//! 素材モデル
//!
//! rawテーブルから派生リレーションを作る3つのモデル:
//!
//! ```text
//! raw.imat_label_map   ──> stg_imat_material ───────────┐
//!                                                       ├──> int_imat_image_material
//! raw.imat_annotations ──> stg_imat_annotation_labels ──┘
//! ```
//!
//! どのモデルも入力行から出力行への純粋関数で、毎回全件を再計算する。

pub mod material;
pub mod annotation_labels;
pub mod image_material;

pub use material::{stg_imat_material, MATERIAL_TASK};
pub use annotation_labels::{cast_label_id, flatten_annotation, stg_imat_annotation_labels};
pub use image_material::int_imat_image_material;

use crate::error::Result;
use crate::types::{AnnotationLabelRow, AnnotationRow, ImageMaterialRow, LabelMapRow, MaterialRow};
use serde::{Deserialize, Serialize};

/// モデル名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelName {
    StgImatMaterial,
    StgImatAnnotationLabels,
    IntImatImageMaterial,
}

impl ModelName {
    /// 実行順（依存先が先）
    pub const ALL: [ModelName; 3] = [
        ModelName::StgImatMaterial,
        ModelName::StgImatAnnotationLabels,
        ModelName::IntImatImageMaterial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::StgImatMaterial => "stg_imat_material",
            ModelName::StgImatAnnotationLabels => "stg_imat_annotation_labels",
            ModelName::IntImatImageMaterial => "int_imat_image_material",
        }
    }

    /// 出力先スキーマ
    pub fn schema(&self) -> &'static str {
        match self {
            ModelName::StgImatMaterial | ModelName::StgImatAnnotationLabels => "staging",
            ModelName::IntImatImageMaterial => "intermediate",
        }
    }

    /// 参照するリレーション名
    pub fn depends_on(&self) -> &'static [&'static str] {
        match self {
            ModelName::StgImatMaterial => &["raw.imat_label_map"],
            ModelName::StgImatAnnotationLabels => &["raw.imat_annotations"],
            ModelName::IntImatImageMaterial => &["stg_imat_annotation_labels", "stg_imat_material"],
        }
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModelName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ModelName::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("Unknown model: {}", s))
    }
}

/// 3モデルの出力
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOutputs {
    pub materials: Vec<MaterialRow>,
    pub annotation_labels: Vec<AnnotationLabelRow>,
    pub image_materials: Vec<ImageMaterialRow>,
}

impl ModelOutputs {
    /// モデルごとの出力行数
    pub fn row_count(&self, model: ModelName) -> usize {
        match model {
            ModelName::StgImatMaterial => self.materials.len(),
            ModelName::StgImatAnnotationLabels => self.annotation_labels.len(),
            ModelName::IntImatImageMaterial => self.image_materials.len(),
        }
    }
}

/// 3モデルを依存順に実行
pub fn run_models(label_map: &[LabelMapRow], annotations: &[AnnotationRow]) -> Result<ModelOutputs> {
    let materials = stg_imat_material(label_map);
    let annotation_labels = stg_imat_annotation_labels(annotations)?;
    let image_materials = int_imat_image_material(&annotation_labels, &materials);

    Ok(ModelOutputs {
        materials,
        annotation_labels,
        image_materials,
    })
}
