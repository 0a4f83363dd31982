//! iMaterialist Common Library
//!
//! rawテーブル・派生リレーションの行型と、素材モデル（参照・展開・結合）

pub mod types;
pub mod error;
pub mod models;

pub use types::{
    AnnotationLabelRow, AnnotationRow, ImageMaterialRow, ImageRow, LabelMapRow, MaterialRow,
    SplitInfoRow, SplitLicenseRow, SplitRow,
};
pub use error::{Error, Result};
pub use models::{
    int_imat_image_material, run_models, stg_imat_annotation_labels, stg_imat_material,
    ModelName, ModelOutputs, MATERIAL_TASK,
};
