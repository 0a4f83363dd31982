//! モデル実行
//!
//! rawテーブルを読み、3モデルを依存順に評価して staging / intermediate に書き出す。
//! 出力ごとにフィンガープリント（行集合のSHA-256）を計算し、
//! 再実行で同じ結果になったかを確認できるようにする。

use crate::error::Result;
use crate::warehouse::{self, Warehouse};
use chrono::{DateTime, Utc};
use imat_common::models::flatten_annotation;
use imat_common::{
    int_imat_image_material, stg_imat_material, AnnotationRow, LabelMapRow, ModelName, ModelOutputs,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, BufWriter};

const RUN_MANIFEST_FILE: &str = "run_manifest.json";

/// モデル1つ分の実行結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelReport {
    pub model: ModelName,
    pub rows: usize,
    pub fingerprint: String,
}

/// 実行結果（ウェアハウス直下の run_manifest.json に保存）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub finished_at: DateTime<Utc>,
    pub models: Vec<ModelReport>,
}

impl RunReport {
    pub fn model(&self, model: ModelName) -> Option<&ModelReport> {
        self.models.iter().find(|r| r.model == model)
    }

    pub fn load(warehouse: &Warehouse) -> Result<Option<Self>> {
        let path = warehouse.root().join(RUN_MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(Some(serde_json::from_reader(reader)?))
    }

    fn save(&self, warehouse: &Warehouse) -> Result<()> {
        let path = warehouse.root().join(RUN_MANIFEST_FILE);
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// モデルの出力テーブル名（`schema.name`）
pub fn model_table(model: ModelName) -> String {
    format!("{}.{}", model.schema(), model.as_str())
}

/// 3モデルを評価する（展開は並列、出力順は逐次評価と同じ）
pub fn evaluate(label_map: &[LabelMapRow], annotations: &[AnnotationRow]) -> Result<ModelOutputs> {
    let materials = stg_imat_material(label_map);

    let annotation_labels = annotations
        .par_iter()
        .map(flatten_annotation)
        .collect::<imat_common::Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    let image_materials = int_imat_image_material(&annotation_labels, &materials);

    Ok(ModelOutputs {
        materials,
        annotation_labels,
        image_materials,
    })
}

/// rawテーブルからモデルを実行し、結果を書き出す
pub fn run(warehouse: &Warehouse) -> Result<(ModelOutputs, RunReport)> {
    let label_map: Vec<LabelMapRow> = warehouse.read(warehouse::LABEL_MAP)?;
    let annotations: Vec<AnnotationRow> = warehouse.read(warehouse::ANNOTATIONS)?;
    tracing::debug!(label_map = label_map.len(), annotations = annotations.len(), "raw tables read");

    let outputs = evaluate(&label_map, &annotations)?;

    // 3テーブルとも一時ファイルに書けてから反映する（途中で失敗したら前回の出力のまま）
    let mut staged = Vec::new();
    let mut models = Vec::new();
    for model in ModelName::ALL {
        let table = model_table(model);
        let (table_file, fingerprint) = match model {
            ModelName::StgImatMaterial => {
                (warehouse.stage(&table, &outputs.materials)?, fingerprint(&outputs.materials)?)
            }
            ModelName::StgImatAnnotationLabels => (
                warehouse.stage(&table, &outputs.annotation_labels)?,
                fingerprint(&outputs.annotation_labels)?,
            ),
            ModelName::IntImatImageMaterial => (
                warehouse.stage(&table, &outputs.image_materials)?,
                fingerprint(&outputs.image_materials)?,
            ),
        };
        staged.push(table_file);
        models.push(ModelReport {
            model,
            rows: outputs.row_count(model),
            fingerprint,
        });
    }

    for table_file in staged {
        table_file.commit()?;
    }
    for report in &models {
        tracing::info!(model = %report.model, rows = report.rows, fingerprint = %report.fingerprint, "model built");
    }

    let report = RunReport {
        finished_at: Utc::now(),
        models,
    };
    report.save(warehouse)?;

    Ok((outputs, report))
}

/// 書き出し済みのモデル出力を読む
pub fn read_outputs(warehouse: &Warehouse) -> Result<ModelOutputs> {
    Ok(ModelOutputs {
        materials: warehouse.read(&model_table(ModelName::StgImatMaterial))?,
        annotation_labels: warehouse.read(&model_table(ModelName::StgImatAnnotationLabels))?,
        image_materials: warehouse.read(&model_table(ModelName::IntImatImageMaterial))?,
    })
}

/// 行集合のフィンガープリント
///
/// 行の並び順には依存しない（重複行は区別する）。
pub fn fingerprint<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut lines = rows
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    lines.sort();

    let mut hasher = Sha256::new();
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    Ok(hex::encode(hasher.finalize()))
}
