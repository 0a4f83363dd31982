//! stg_imat_material: 素材ラベルの参照テーブル

use crate::types::{LabelMapRow, MaterialRow};

/// 素材タスクの task_name（完全一致・大文字小文字を区別）
pub const MATERIAL_TASK: &str = "material";

/// ラベルマップから素材タスクの行だけを取り出し、label_name を material_name に改名する
pub fn stg_imat_material(label_map: &[LabelMapRow]) -> Vec<MaterialRow> {
    label_map
        .iter()
        .filter(|row| row.task_name == MATERIAL_TASK)
        .map(|row| MaterialRow {
            label_id: row.label_id,
            material_name: row.label_name.clone(),
        })
        .collect()
}
