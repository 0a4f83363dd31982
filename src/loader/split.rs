//! splitファイル（train.json / validation.json）の読み込み
//!
//! ```json
//! {
//!   "info": {...},
//!   "license": {...},
//!   "images": [{"url": "...", "imageId": "1"}],
//!   "annotations": [{"labelId": ["95", "66"], "imageId": "1"}]
//! }
//! ```
//!
//! どのキーも省略可能（validation.json には info/license がないことがある）。
//! 同じsplitの既存行は削除してから入れ直すので、何度実行してもよい。

use crate::error::{ImatError, Result};
use crate::warehouse::{self, Warehouse};
use imat_common::{AnnotationRow, ImageRow, SplitInfoRow, SplitLicenseRow};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// splitファイルの構造
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SplitFile {
    pub info: Option<Value>,
    pub license: Option<Value>,
    pub images: Vec<RawImage>,
    pub annotations: Vec<RawAnnotation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImage {
    pub image_id: RawId,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnnotation {
    pub image_id: RawId,
    /// データセットでは文字列の配列。そのまま保存する。
    pub label_id: Value,
}

/// imageId（文字列でも数値でもよい）
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Str(String),
}

impl RawId {
    pub fn to_i64(&self) -> Result<i64> {
        match self {
            RawId::Int(v) => Ok(*v),
            RawId::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ImatError::SplitFile(format!("imageId が整数ではありません: {:?}", s))),
        }
    }
}

/// 1split分のロード結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitLoadReport {
    pub split: String,
    pub info_loaded: bool,
    pub license_loaded: bool,
    pub images: usize,
    pub annotations: usize,
}

/// splitファイルを読む
pub fn read_split_file(json_path: &Path) -> Result<SplitFile> {
    if !json_path.exists() {
        return Err(ImatError::FileNotFound(json_path.display().to_string()));
    }
    let reader = BufReader::new(File::open(json_path)?);
    let split_file = serde_json::from_reader(reader)
        .map_err(|e| ImatError::SplitFile(format!("{}: {}", json_path.display(), e)))?;
    Ok(split_file)
}

/// 1split分を info/license・images・annotations の各rawテーブルへロード
pub fn load_split(
    warehouse: &Warehouse,
    json_path: &Path,
    split: &str,
    batch_size: usize,
) -> Result<SplitLoadReport> {
    let split_file = read_split_file(json_path)?;

    // (split, image_id) は主キー。既存行を消す前に検証する
    ensure_unique_ids("images", split_file.images.iter().map(|img| &img.image_id))?;
    ensure_unique_ids("annotations", split_file.annotations.iter().map(|ann| &ann.image_id))?;

    let (info_loaded, license_loaded) = load_info_and_license(warehouse, &split_file, split)?;
    let images = load_images(warehouse, &split_file.images, split, batch_size)?;
    let annotations = load_annotations(warehouse, &split_file.annotations, split, batch_size)?;

    Ok(SplitLoadReport {
        split: split.to_string(),
        info_loaded,
        license_loaded,
        images,
        annotations,
    })
}

/// imageId の重複を検出する（"1" と 1 は同じID）
pub fn ensure_unique_ids<'a, I>(section: &str, ids: I) -> Result<()>
where
    I: IntoIterator<Item = &'a RawId>,
{
    let mut seen = HashSet::new();
    for id in ids {
        let image_id = id.to_i64()?;
        if !seen.insert(image_id) {
            return Err(ImatError::SplitFile(format!(
                "{}: imageId {} が重複しています",
                section, image_id
            )));
        }
    }
    Ok(())
}

fn load_info_and_license(warehouse: &Warehouse, split_file: &SplitFile, split: &str) -> Result<(bool, bool)> {
    if split_file.info.is_none() && split_file.license.is_none() {
        tracing::info!(split, "no info/license, skipped");
        return Ok((false, false));
    }

    warehouse.delete_split::<SplitInfoRow>(warehouse::INFO, split)?;
    warehouse.delete_split::<SplitLicenseRow>(warehouse::LICENSE, split)?;

    if let Some(info) = &split_file.info {
        warehouse.append(warehouse::INFO, &[SplitInfoRow {
            split: split.to_string(),
            info: info.clone(),
        }])?;
    }
    if let Some(license) = &split_file.license {
        warehouse.append(warehouse::LICENSE, &[SplitLicenseRow {
            split: split.to_string(),
            license: license.clone(),
        }])?;
    }

    Ok((split_file.info.is_some(), split_file.license.is_some()))
}

fn load_images(warehouse: &Warehouse, images: &[RawImage], split: &str, batch_size: usize) -> Result<usize> {
    warehouse.delete_split::<ImageRow>(warehouse::IMAGES, split)?;

    let progress = progress_bar(images.len(), &format!("iMAT {} images", split));
    for batch in images.chunks(batch_size.max(1)) {
        let rows = batch
            .iter()
            .map(|img| {
                Ok(ImageRow {
                    split: split.to_string(),
                    image_id: img.image_id.to_i64()?,
                    url: img.url.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        warehouse.append(warehouse::IMAGES, &rows)?;
        progress.inc(rows.len() as u64);
    }
    progress.finish_and_clear();

    tracing::info!(split, rows = images.len(), "images loaded");
    Ok(images.len())
}

fn load_annotations(
    warehouse: &Warehouse,
    annotations: &[RawAnnotation],
    split: &str,
    batch_size: usize,
) -> Result<usize> {
    warehouse.delete_split::<AnnotationRow>(warehouse::ANNOTATIONS, split)?;

    let progress = progress_bar(annotations.len(), &format!("iMAT {} annotations", split));
    for batch in annotations.chunks(batch_size.max(1)) {
        let rows = batch
            .iter()
            .map(|ann| {
                Ok(AnnotationRow {
                    split: split.to_string(),
                    image_id: ann.image_id.to_i64()?,
                    label_ids: ann.label_id.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        warehouse.append(warehouse::ANNOTATIONS, &rows)?;
        progress.inc(rows.len() as u64);
    }
    progress.finish_and_clear();

    tracing::info!(split, rows = annotations.len(), "annotations loaded");
    Ok(annotations.len())
}

fn progress_bar(len: usize, message: &str) -> ProgressBar {
    let progress = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress.set_message(message.to_string());
    progress
}
