//! JSON出力（リレーションごとに1ファイル）

use crate::error::Result;
use imat_common::{ModelName, ModelOutputs};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub fn write_json(outputs: &ModelOutputs, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut paths = Vec::new();
    for model in ModelName::ALL {
        let path = dir.join(format!("{}.json", model.as_str()));
        match model {
            ModelName::StgImatMaterial => write_rows(&path, &outputs.materials)?,
            ModelName::StgImatAnnotationLabels => write_rows(&path, &outputs.annotation_labels)?,
            ModelName::IntImatImageMaterial => write_rows(&path, &outputs.image_materials)?,
        }
        paths.push(path);
    }
    Ok(paths)
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, rows)?;
    Ok(())
}
