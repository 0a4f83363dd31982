//! ラベルマップ（label_map_228.xlsx）の読み込み
//!
//! 先頭シートの1行目をヘッダとして、`labelId` / `taskId` / `labelName` / `taskName`
//! の列を探す（列の順番は問わない）。

use crate::error::{ImatError, Result};
use crate::warehouse::{self, Warehouse};
use calamine::{open_workbook_auto, Data, Reader};
use imat_common::{LabelMapRow, MATERIAL_TASK};
use std::collections::HashSet;
use std::path::Path;

const COL_LABEL_ID: &str = "labelId";
const COL_TASK_ID: &str = "taskId";
const COL_LABEL_NAME: &str = "labelName";
const COL_TASK_NAME: &str = "taskName";

/// ヘッダ行から見つけた列位置
struct Columns {
    label_id: usize,
    task_id: usize,
    label_name: usize,
    task_name: usize,
}

impl Columns {
    fn from_header(header: &[Data]) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|cell| matches!(cell, Data::String(s) if s.trim() == name))
                .ok_or_else(|| ImatError::LabelMap(format!("列が見つかりません: {}", name)))
        };

        Ok(Self {
            label_id: find(COL_LABEL_ID)?,
            task_id: find(COL_TASK_ID)?,
            label_name: find(COL_LABEL_NAME)?,
            task_name: find(COL_TASK_NAME)?,
        })
    }
}

/// xlsxからラベルマップを読み込む
pub fn read_label_map(xlsx_path: &Path) -> Result<Vec<LabelMapRow>> {
    if !xlsx_path.exists() {
        return Err(ImatError::FileNotFound(xlsx_path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(xlsx_path)
        .map_err(|e| ImatError::LabelMap(format!("ブックを開けません: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImatError::LabelMap("シートがありません".into()))?
        .map_err(|e| ImatError::LabelMap(format!("シート読み込みエラー: {}", e)))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| ImatError::LabelMap("ヘッダ行がありません".into()))?;
    let columns = Columns::from_header(header)?;

    let mut label_map = Vec::new();
    let mut seen = HashSet::new();

    // Excel上の行番号（ヘッダが1行目）
    for (line, row) in rows.enumerate().map(|(i, r)| (i + 2, r)) {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        let label_id = int_cell(row, columns.label_id, COL_LABEL_ID, line)?;
        let task_id = int_cell(row, columns.task_id, COL_TASK_ID, line)?;
        let label_name = text_cell(row, columns.label_name, COL_LABEL_NAME, line)?;
        let task_name = text_cell(row, columns.task_name, COL_TASK_NAME, line)?;

        if !seen.insert(label_id) {
            return Err(ImatError::LabelMap(format!(
                "{}行目: labelId {} が重複しています",
                line, label_id
            )));
        }

        label_map.push(LabelMapRow {
            label_id,
            task_id,
            label_name,
            task_name,
        });
    }

    Ok(label_map)
}

/// ラベルマップを読み込み、raw.imat_label_map を置き換える
pub fn load_label_map(warehouse: &Warehouse, xlsx_path: &Path) -> Result<usize> {
    let label_map = read_label_map(xlsx_path)?;
    warehouse.replace(warehouse::LABEL_MAP, &label_map)?;
    tracing::info!(rows = label_map.len(), path = %xlsx_path.display(), "label map loaded");
    Ok(label_map.len())
}

/// 素材ラベルをラベル名順に並べる
pub fn material_labels_by_name(label_map: &[LabelMapRow]) -> Vec<&LabelMapRow> {
    let mut materials: Vec<&LabelMapRow> = label_map
        .iter()
        .filter(|row| row.task_name == MATERIAL_TASK)
        .collect();
    materials.sort_by(|a, b| a.label_name.cmp(&b.label_name));
    materials
}

fn int_cell(row: &[Data], col: usize, name: &str, line: usize) -> Result<i32> {
    let cell = row.get(col).unwrap_or(&Data::Empty);
    let value = match cell {
        Data::Int(v) => i32::try_from(*v).ok(),
        // xlsxの数値はfloatで返ってくる
        Data::Float(v) if v.fract() == 0.0 && *v >= i32::MIN as f64 && *v <= i32::MAX as f64 => {
            Some(*v as i32)
        }
        Data::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };
    value.ok_or_else(|| {
        ImatError::LabelMap(format!("{}行目: {} が整数ではありません: {:?}", line, name, cell))
    })
}

fn text_cell(row: &[Data], col: usize, name: &str, line: usize) -> Result<String> {
    let cell = row.get(col).unwrap_or(&Data::Empty);
    let value = match cell {
        Data::String(s) => s.clone(),
        Data::Int(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        _ => String::new(),
    };
    if value.is_empty() {
        return Err(ImatError::LabelMap(format!("{}行目: {} が空です", line, name)));
    }
    Ok(value)
}
