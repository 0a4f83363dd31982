pub mod excel;
pub mod json;

use crate::cli::ExportFormat;
use crate::error::Result;
use imat_common::ModelOutputs;
use std::path::{Path, PathBuf};

fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.to_path_buf()
    }
}

fn json_dir(output: &Path) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.to_path_buf()
    } else {
        output.parent().unwrap_or_else(|| Path::new(".")).to_path_buf()
    }
}

/// モデル出力をエクスポートし、書き出したファイルを返す
pub fn export_outputs(
    outputs: &ModelOutputs,
    format: &ExportFormat,
    output: &Path,
    title: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if matches!(format, ExportFormat::Json | ExportFormat::Both) {
        let dir = json_dir(output);
        println!("- JSONを出力中...");
        let paths = json::write_json(outputs, &dir)?;
        for path in &paths {
            println!("✔ JSON出力: {}", path.display());
        }
        written.extend(paths);
    }

    if matches!(format, ExportFormat::Excel | ExportFormat::Both) {
        let path = output_path_for_format(output, title, "xlsx");
        println!("- Excelを生成中...");
        excel::generate_excel(outputs, &path)?;
        println!("✔ Excel出力: {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for_directory_like_path() {
        let path = output_path_for_format(Path::new("out"), "imat_materials", "xlsx");
        assert_eq!(path, PathBuf::from("out/imat_materials.xlsx"));
    }

    #[test]
    fn test_output_path_for_file_path() {
        let path = output_path_for_format(Path::new("out/report.xlsx"), "imat_materials", "xlsx");
        assert_eq!(path, PathBuf::from("out/report.xlsx"));
        assert_eq!(json_dir(Path::new("out/report.xlsx")), PathBuf::from("out"));
    }
}
