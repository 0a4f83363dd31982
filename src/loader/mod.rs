//! rawテーブルへのロード
//!
//! データセットフォルダの label_map_228.xlsx と splitごとのJSONを
//! ウェアハウスの raw スキーマに取り込む。

pub mod label_map;
pub mod split;

pub use label_map::{load_label_map, material_labels_by_name, read_label_map};
pub use split::{load_split, read_split_file, SplitLoadReport};

use crate::error::{ImatError, Result};
use crate::warehouse::Warehouse;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const LABEL_MAP_FILE: &str = "label_map_228.xlsx";

/// ロード全体の結果
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub label_map_rows: usize,
    pub splits: Vec<SplitLoadReport>,
}

/// split名に対応するJSONファイル
pub fn split_path(imat_dir: &Path, split: &str) -> PathBuf {
    imat_dir.join(format!("{}.json", split))
}

/// フォルダ直下の *.json をsplitとして列挙（ファイル名順）
pub fn discover_splits(imat_dir: &Path) -> Result<Vec<String>> {
    if !imat_dir.exists() {
        return Err(ImatError::FolderNotFound(imat_dir.display().to_string()));
    }

    let mut splits: Vec<String> = WalkDir::new(imat_dir)
        .max_depth(1)  // 直下のみ
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .filter_map(|e| e.path().file_stem().map(|s| s.to_string_lossy().to_string()))
        .collect();

    splits.sort();
    Ok(splits)
}

/// ラベルマップと各splitをロード
pub fn load_all(
    warehouse: &Warehouse,
    imat_dir: &Path,
    splits: &[String],
    batch_size: usize,
) -> Result<LoadReport> {
    if !imat_dir.exists() {
        return Err(ImatError::FolderNotFound(imat_dir.display().to_string()));
    }

    let label_map_rows = load_label_map(warehouse, &imat_dir.join(LABEL_MAP_FILE))?;

    let mut reports = Vec::new();
    for split in splits {
        let report = load_split(warehouse, &split_path(imat_dir, split), split, batch_size)?;
        reports.push(report);
    }

    Ok(LoadReport {
        label_map_rows,
        splits: reports,
    })
}
