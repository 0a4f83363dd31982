//! Excel出力
//!
//! リレーションごとに1シート。1行目がカラム名。
//! シートの最大行数を超える場合は `<name>_2`, `<name>_3` ... に分割する。

use crate::error::{ImatError, Result};
use imat_common::{AnnotationLabelRow, ImageMaterialRow, MaterialRow, ModelName, ModelOutputs};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;

/// 1シートあたりのデータ行数（ヘッダ行を除く）
const MAX_DATA_ROWS: usize = 1_048_575;

/// セルの値
pub enum CellValue {
    Text(String),
    Number(f64),
    /// NULL。セルを書かない
    Empty,
}

/// シートに書き出す行
pub trait SheetRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<CellValue>;
}

impl SheetRow for MaterialRow {
    fn headers() -> &'static [&'static str] {
        &["label_id", "material_name"]
    }

    fn cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::Number(self.label_id as f64),
            CellValue::Text(self.material_name.clone()),
        ]
    }
}

impl SheetRow for AnnotationLabelRow {
    fn headers() -> &'static [&'static str] {
        &["split", "image_id", "label_id"]
    }

    fn cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.split.clone()),
            CellValue::Number(self.image_id as f64),
            self.label_id.map_or(CellValue::Empty, |id| CellValue::Number(id as f64)),
        ]
    }
}

impl SheetRow for ImageMaterialRow {
    fn headers() -> &'static [&'static str] {
        &["split", "image_id", "material_id", "material_name"]
    }

    fn cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.split.clone()),
            CellValue::Number(self.image_id as f64),
            CellValue::Number(self.material_id as f64),
            CellValue::Text(self.material_name.clone()),
        ]
    }
}

pub fn generate_excel(outputs: &ModelOutputs, output_path: &Path) -> Result<()> {
    let buffer = generate_excel_buffer(outputs).map_err(xlsx_error)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, buffer)?;
    Ok(())
}

/// Excelをバッファに生成
pub fn generate_excel_buffer(outputs: &ModelOutputs) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for model in ModelName::ALL {
        match model {
            ModelName::StgImatMaterial => {
                add_sheets(&mut workbook, model.as_str(), &outputs.materials, &header_format)?
            }
            ModelName::StgImatAnnotationLabels => {
                add_sheets(&mut workbook, model.as_str(), &outputs.annotation_labels, &header_format)?
            }
            ModelName::IntImatImageMaterial => {
                add_sheets(&mut workbook, model.as_str(), &outputs.image_materials, &header_format)?
            }
        }
    }

    workbook.save_to_buffer()
}

fn add_sheets<T: SheetRow>(
    workbook: &mut Workbook,
    name: &str,
    rows: &[T],
    header_format: &Format,
) -> std::result::Result<(), XlsxError> {
    // 空でもヘッダだけのシートを作る
    let chunks: Vec<&[T]> = if rows.is_empty() {
        vec![rows]
    } else {
        rows.chunks(MAX_DATA_ROWS).collect()
    };

    for (idx, chunk) in chunks.into_iter().enumerate() {
        let sheet_name = if idx == 0 {
            name.to_string()
        } else {
            format!("{}_{}", name, idx + 1)
        };

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet_name)?;

        for (col, header) in T::headers().iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, header_format)?;
        }

        for (row_idx, row) in chunk.iter().enumerate() {
            let excel_row = (row_idx + 1) as u32;
            for (col, cell) in row.cells().into_iter().enumerate() {
                match cell {
                    CellValue::Text(text) => worksheet.write_string(excel_row, col as u16, text)?,
                    CellValue::Number(value) => worksheet.write_number(excel_row, col as u16, value)?,
                    CellValue::Empty => continue,
                };
            }
        }
    }

    Ok(())
}

fn xlsx_error(e: XlsxError) -> ImatError {
    ImatError::ExcelGeneration(e.to_string())
}
