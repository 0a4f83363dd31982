//! int_imat_image_material: 画像×素材の結合
//!
//! label_id による内部結合。素材ラベルに存在しない label_id と NULL の行は出力されない。

use crate::types::{AnnotationLabelRow, ImageMaterialRow, MaterialRow};
use std::collections::HashMap;

/// 展開済みアノテーションと素材ラベルを label_id で内部結合する
///
/// 出力順は `labels` の順。同じ label_id の素材行が複数あれば、その数だけ行が出る。
pub fn int_imat_image_material(
    labels: &[AnnotationLabelRow],
    materials: &[MaterialRow],
) -> Vec<ImageMaterialRow> {
    let mut by_id: HashMap<i32, Vec<&MaterialRow>> = HashMap::new();
    for material in materials {
        by_id.entry(material.label_id).or_default().push(material);
    }

    labels
        .iter()
        .filter_map(|label| {
            let matches = label.label_id.and_then(|id| by_id.get(&id))?;
            Some((label, matches))
        })
        .flat_map(|(label, matches)| {
            matches.iter().map(move |material| ImageMaterialRow {
                split: label.split.clone(),
                image_id: label.image_id,
                material_id: material.label_id,
                material_name: material.material_name.clone(),
            })
        })
        .collect()
}
