//! モデル実行・エクスポートの統合テスト

use calamine::{open_workbook_auto, Reader};
use imat_common::{AnnotationRow, ImageMaterialRow, LabelMapRow, MaterialRow, ModelName};
use imat_materials::cli::ExportFormat;
use imat_materials::error::ImatError;
use imat_materials::export;
use imat_materials::pipeline::{self, RunReport};
use imat_materials::warehouse::{self, Warehouse};
use serde_json::json;
use tempfile::tempdir;

fn label(label_id: i32, label_name: &str, task_name: &str) -> LabelMapRow {
    LabelMapRow {
        label_id,
        task_id: 0,
        label_name: label_name.to_string(),
        task_name: task_name.to_string(),
    }
}

fn annotation(split: &str, image_id: i64, label_ids: serde_json::Value) -> AnnotationRow {
    AnnotationRow {
        split: split.to_string(),
        image_id,
        label_ids,
    }
}

fn seeded_warehouse(root: &std::path::Path) -> Warehouse {
    let warehouse = Warehouse::open(root).unwrap();
    warehouse
        .replace(warehouse::LABEL_MAP, &[
            label(5, "cotton", "material"),
            label(7, "dress", "category"),
            label(8, "denim", "material"),
        ])
        .unwrap();
    warehouse
        .replace(warehouse::ANNOTATIONS, &[
            annotation("train", 1, json!(["5", "7"])),
            annotation("train", 2, json!([])),
            annotation("validation", 3, json!(["8", "5", "99"])),
        ])
        .unwrap();
    warehouse
}

/// label 5 = cotton（素材）、画像 img1 に [5, 7]、7 はラベルマップにない
#[test]
fn test_cotton_example_end_to_end() {
    let dir = tempdir().expect("Failed to create temp dir");
    let warehouse = Warehouse::open(dir.path()).unwrap();
    warehouse
        .replace(warehouse::LABEL_MAP, &[label(5, "cotton", "material")])
        .unwrap();
    warehouse
        .replace(warehouse::ANNOTATIONS, &[annotation("train", 1, json!([5, 7]))])
        .unwrap();

    let (outputs, _) = pipeline::run(&warehouse).unwrap();

    assert_eq!(outputs.image_materials, vec![ImageMaterialRow {
        split: "train".into(),
        image_id: 1,
        material_id: 5,
        material_name: "cotton".into(),
    }]);
}

#[test]
fn test_run_writes_model_tables() {
    let dir = tempdir().expect("Failed to create temp dir");
    let warehouse = seeded_warehouse(dir.path());

    let (outputs, report) = pipeline::run(&warehouse).unwrap();

    let materials: Vec<MaterialRow> = warehouse.read("staging.stg_imat_material").unwrap();
    assert_eq!(materials, outputs.materials);
    assert_eq!(materials.len(), 2);

    let stored = pipeline::read_outputs(&warehouse).unwrap();
    assert_eq!(stored, outputs);

    // 展開: 2 + 0 + 3 行、結合: 5, 8, 5 の3行（7 と 99 は落ちる）
    assert_eq!(report.model(ModelName::StgImatAnnotationLabels).unwrap().rows, 5);
    assert_eq!(report.model(ModelName::IntImatImageMaterial).unwrap().rows, 3);
    assert!(outputs
        .image_materials
        .iter()
        .all(|row| materials.iter().any(|m| m.label_id == row.material_id)));

    let manifest = RunReport::load(&warehouse).unwrap().expect("run_manifest.json がない");
    assert_eq!(manifest.models, report.models);
}

#[test]
fn test_rerun_yields_identical_fingerprints() {
    let dir = tempdir().expect("Failed to create temp dir");
    let warehouse = seeded_warehouse(dir.path());

    let (first_outputs, first) = pipeline::run(&warehouse).unwrap();
    let (second_outputs, second) = pipeline::run(&warehouse).unwrap();

    assert_eq!(first_outputs, second_outputs);
    assert_eq!(first.models, second.models);
}

#[test]
fn test_run_on_empty_warehouse() {
    let dir = tempdir().expect("Failed to create temp dir");
    let warehouse = Warehouse::open(dir.path()).unwrap();

    let (outputs, report) = pipeline::run(&warehouse).unwrap();
    assert!(outputs.materials.is_empty());
    assert!(outputs.image_materials.is_empty());
    assert_eq!(report.models.len(), 3);
}

#[test]
fn test_cast_failure_leaves_previous_outputs() {
    let dir = tempdir().expect("Failed to create temp dir");
    let warehouse = seeded_warehouse(dir.path());
    let (before, _) = pipeline::run(&warehouse).unwrap();

    warehouse
        .replace(warehouse::ANNOTATIONS, &[annotation("train", 1, json!(["cotton"]))])
        .unwrap();
    let err = pipeline::run(&warehouse).unwrap_err();
    assert!(matches!(err, ImatError::Common(imat_common::Error::Cast { .. })));

    let after = pipeline::read_outputs(&warehouse).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_write_failure_leaves_all_previous_outputs() {
    let dir = tempdir().expect("Failed to create temp dir");
    let warehouse = seeded_warehouse(dir.path());
    let (before, _) = pipeline::run(&warehouse).unwrap();

    // 最後のテーブルの一時ファイルを作れないようにする
    let blocker = warehouse
        .table_path("intermediate.int_imat_image_material")
        .unwrap()
        .with_extension("jsonl.tmp");
    std::fs::create_dir_all(&blocker).unwrap();

    warehouse
        .replace(warehouse::ANNOTATIONS, &[annotation("train", 9, json!(["8"]))])
        .unwrap();
    assert!(pipeline::run(&warehouse).is_err());

    let after = pipeline::read_outputs(&warehouse).unwrap();
    assert_eq!(before, after);

    // 先に書いた一時ファイルは残らない
    let staged_material = warehouse
        .table_path("staging.stg_imat_material")
        .unwrap()
        .with_extension("jsonl.tmp");
    assert!(!staged_material.exists());
}

#[test]
fn test_null_label_id_does_not_fail_run() {
    let dir = tempdir().expect("Failed to create temp dir");
    let warehouse = Warehouse::open(dir.path()).unwrap();
    warehouse
        .replace(warehouse::LABEL_MAP, &[label(5, "cotton", "material")])
        .unwrap();
    warehouse
        .replace(warehouse::ANNOTATIONS, &[annotation("train", 1, json!(["5", null]))])
        .unwrap();

    let (outputs, _) = pipeline::run(&warehouse).unwrap();

    let ids: Vec<Option<i32>> = outputs.annotation_labels.iter().map(|r| r.label_id).collect();
    assert_eq!(ids, vec![Some(5), None]);
    assert_eq!(outputs.image_materials.len(), 1);

    let stored = pipeline::read_outputs(&warehouse).unwrap();
    assert_eq!(stored.annotation_labels, outputs.annotation_labels);
}

#[test]
fn test_export_json_and_excel() {
    let dir = tempdir().expect("Failed to create temp dir");
    let out = tempdir().expect("Failed to create temp dir");
    let warehouse = seeded_warehouse(dir.path());
    let (outputs, _) = pipeline::run(&warehouse).unwrap();

    let written = export::export_outputs(&outputs, &ExportFormat::Both, out.path(), "imat_materials").unwrap();
    assert_eq!(written.len(), 4);

    let json = std::fs::read_to_string(out.path().join("int_imat_image_material.json")).unwrap();
    let rows: Vec<ImageMaterialRow> = serde_json::from_str(&json).unwrap();
    assert_eq!(rows, outputs.image_materials);

    let xlsx_path = out.path().join("imat_materials.xlsx");
    let mut workbook = open_workbook_auto(&xlsx_path).expect("xlsxを開けない");
    let sheets = workbook.sheet_names().to_owned();
    assert_eq!(sheets, vec![
        "stg_imat_material",
        "stg_imat_annotation_labels",
        "int_imat_image_material",
    ]);

    let range = workbook.worksheet_range("int_imat_image_material").unwrap();
    // ヘッダ + 3行
    assert_eq!(range.height(), 4);
}
