//! ウェアハウス
//!
//! フォルダ1つをデータベースに見立て、`schema.name` のテーブルを
//! `<root>/<schema>/<name>.jsonl` に保存する。

pub mod table;

use crate::error::{ImatError, Result};
use imat_common::SplitRow;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const LABEL_MAP: &str = "raw.imat_label_map";
pub const ANNOTATIONS: &str = "raw.imat_annotations";
pub const IMAGES: &str = "raw.imat_images";
pub const INFO: &str = "raw.imat_info";
pub const LICENSE: &str = "raw.imat_license";

#[derive(Debug, Clone)]
pub struct Warehouse {
    root: PathBuf,
}

impl Warehouse {
    /// ウェアハウスを開く（なければ作成）
    pub fn open(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        Ok(Self { root: root.to_path_buf() })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// テーブル名からファイルパスを求める
    pub fn table_path(&self, table: &str) -> Result<PathBuf> {
        let (schema, name) = table
            .split_once('.')
            .filter(|(schema, name)| is_identifier(schema) && is_identifier(name))
            .ok_or_else(|| ImatError::Warehouse(format!("不正なテーブル名: {}", table)))?;
        Ok(self.root.join(schema).join(format!("{}.jsonl", name)))
    }

    /// 全行を読む（テーブルがなければ空）
    pub fn read<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        let path = self.table_path(table)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let (_, rows) = table::read_table(&path, table)?;
        Ok(rows)
    }

    /// テーブル全体を置き換える
    pub fn replace<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<()> {
        let path = self.table_path(table)?;
        table::write_table(&path, table, rows)?;
        tracing::debug!(table, rows = rows.len(), "replaced table");
        Ok(())
    }

    /// テーブル全体を一時ファイルに書く（commit するまで反映しない）
    pub fn stage<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<table::StagedTable> {
        let path = self.table_path(table)?;
        let staged = table::stage_table(&path, table, rows)?;
        tracing::debug!(table, rows = rows.len(), "staged table");
        Ok(staged)
    }

    /// 末尾に追加する
    pub fn append<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<()> {
        let path = self.table_path(table)?;
        table::append_rows(&path, table, rows)?;
        tracing::trace!(table, rows = rows.len(), "appended rows");
        Ok(())
    }

    /// 条件に合う行を削除し、削除件数を返す
    pub fn delete_where<T, F>(&self, table: &str, predicate: F) -> Result<usize>
    where
        T: Serialize + DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let path = self.table_path(table)?;
        if !path.exists() {
            return Ok(0);
        }

        let mut rows: Vec<T> = self.read(table)?;
        let before = rows.len();
        rows.retain(|row| !predicate(row));
        let deleted = before - rows.len();

        if deleted > 0 {
            table::write_table(&path, table, &rows)?;
        }
        Ok(deleted)
    }

    /// 指定splitの行を削除（再実行できるように、ロード前に呼ぶ）
    pub fn delete_split<T>(&self, table: &str, split: &str) -> Result<usize>
    where
        T: SplitRow + Serialize + DeserializeOwned,
    {
        let deleted = self.delete_where(table, |row: &T| row.split() == split)?;
        tracing::debug!(table, split, deleted, "deleted split rows");
        Ok(deleted)
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
