//! テーブルファイル
//!
//! 1テーブル = 1ファイル（JSON Lines）。
//! 1行目がヘッダ、2行目以降が1行1レコード。
//!
//! ```text
//! {"version":1,"table":"raw.imat_images","created_at":"2026-01-18T00:00:00Z"}
//! {"split":"train","image_id":1,"url":"https://..."}
//! ...
//! ```

use crate::error::{ImatError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// テーブルファイルのヘッダ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableHeader {
    /// バージョン（互換性チェック用）
    pub version: u32,
    /// テーブル名（`schema.name`）
    pub table: String,
    /// 作成日時（置き換え時に更新）
    pub created_at: DateTime<Utc>,
}

impl TableHeader {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(table: &str) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            table: table.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// ヘッダと全行を読み込む
pub fn read_table<T: DeserializeOwned>(path: &Path, table: &str) -> Result<(TableHeader, Vec<T>)> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines();

    let header_line = lines
        .next()
        .transpose()?
        .ok_or_else(|| ImatError::Warehouse(format!("ヘッダがありません: {}", path.display())))?;
    let header: TableHeader = serde_json::from_str(&header_line)?;

    // バージョンチェック
    if header.version != TableHeader::CURRENT_VERSION {
        return Err(ImatError::Warehouse(format!(
            "未対応のバージョン {} ({})",
            header.version,
            path.display()
        )));
    }
    if header.table != table {
        return Err(ImatError::Warehouse(format!(
            "テーブル名が一致しません: {} != {}",
            header.table, table
        )));
    }

    let mut rows = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(serde_json::from_str(&line)?);
    }

    Ok((header, rows))
}

/// 一時ファイルに書き終えた、まだ反映していないテーブル
///
/// [`StagedTable::commit`] でリネームして反映する。commit せずに drop すると一時ファイルを消す。
#[derive(Debug)]
pub struct StagedTable {
    tmp_path: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl StagedTable {
    pub fn commit(mut self) -> Result<()> {
        std::fs::rename(&self.tmp_path, &self.path)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedTable {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.tmp_path);
        }
    }
}

/// テーブル全体を一時ファイル（`<name>.jsonl.tmp`）に書く
pub fn stage_table<T: Serialize>(path: &Path, table: &str, rows: &[T]) -> Result<StagedTable> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("jsonl.tmp");
    let file = File::create(&tmp_path)?;
    let staged = StagedTable {
        tmp_path,
        path: path.to_path_buf(),
        committed: false,
    };

    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &TableHeader::new(table))?;
    writer.write_all(b"\n")?;
    write_rows(&mut writer, rows)?;
    writer.flush()?;

    Ok(staged)
}

/// テーブルを書き換える（一時ファイルに書いてからリネーム）
pub fn write_table<T: Serialize>(path: &Path, table: &str, rows: &[T]) -> Result<()> {
    stage_table(path, table, rows)?.commit()
}

/// 末尾に行を追加する（ファイルがなければヘッダから作る）
pub fn append_rows<T: Serialize>(path: &Path, table: &str, rows: &[T]) -> Result<()> {
    if !path.exists() {
        return write_table(path, table, rows);
    }

    let file = OpenOptions::new().append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    write_rows(&mut writer, rows)?;
    writer.flush()?;
    Ok(())
}

fn write_rows<T: Serialize, W: Write>(writer: &mut W, rows: &[T]) -> Result<()> {
    for row in rows {
        serde_json::to_writer(&mut *writer, row)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}
