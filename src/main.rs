use clap::Parser;
use imat_materials::{cli, config, error, export, inspect, loader, logging, pipeline, warehouse};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use imat_common::ModelName;
use warehouse::Warehouse;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Load { imat_dir, split, all_splits, batch_size } => {
            println!("📦 imat - rawテーブルへのロード\n");

            let imat_dir = config.resolve_imat_dir(imat_dir.as_deref());
            let warehouse = Warehouse::open(&config.resolve_warehouse_dir(cli.warehouse.as_deref()))?;
            let splits = if all_splits {
                loader::discover_splits(&imat_dir)?
            } else if split.is_empty() {
                config.splits.clone()
            } else {
                split
            };
            let batch_size = batch_size.unwrap_or(config.batch_size).max(1);

            println!("- データセット: {}", imat_dir.display());
            println!("- ウェアハウス: {}", warehouse.root().display());
            println!("- split: {}\n", splits.join(", "));

            let report = loader::load_all(&warehouse, &imat_dir, &splits, batch_size)?;

            println!("✔ label_map: {}行 -> {}", report.label_map_rows, warehouse::LABEL_MAP);
            for split in &report.splits {
                if !split.info_loaded && !split.license_loaded {
                    println!("- {}: info/license なし（スキップ）", split.split);
                }
                println!("✔ {}: images {}行 -> {}", split.split, split.images, warehouse::IMAGES);
                println!("✔ {}: annotations {}行 -> {}", split.split, split.annotations, warehouse::ANNOTATIONS);
            }

            println!("\n✅ ロード完了");
        }

        Commands::Run => {
            println!("🚀 imat - モデル実行\n");

            let warehouse = Warehouse::open(&config.resolve_warehouse_dir(cli.warehouse.as_deref()))?;
            let previous = pipeline::RunReport::load(&warehouse)?;
            let (_, report) = pipeline::run(&warehouse)?;

            for (step, model) in ModelName::ALL.iter().enumerate() {
                let Some(result) = report.model(*model) else { continue };
                let unchanged = previous
                    .as_ref()
                    .and_then(|p| p.model(*model))
                    .is_some_and(|p| p.fingerprint == result.fingerprint);

                println!(
                    "[{}/{}] {} ({}行) {}{}",
                    step + 1,
                    ModelName::ALL.len(),
                    pipeline::model_table(*model),
                    result.rows,
                    &result.fingerprint[..12],
                    if unchanged { " (前回と同一)" } else { "" },
                );
            }

            println!("\n✅ 実行完了");
        }

        Commands::Export { format, output, title } => {
            println!("📄 imat - エクスポート\n");

            let warehouse = Warehouse::open(&config.resolve_warehouse_dir(cli.warehouse.as_deref()))?;
            let outputs = pipeline::read_outputs(&warehouse)?;
            let output = output.unwrap_or_else(|| std::path::PathBuf::from("."));

            export::export_outputs(&outputs, &format, &output, &title)?;

            println!("\n✅ エクスポート完了");
        }

        Commands::Materials { label_map, imat_dir, limit } => {
            let path = label_map.unwrap_or_else(|| {
                config.resolve_imat_dir(imat_dir.as_deref()).join(loader::LABEL_MAP_FILE)
            });
            let rows = loader::read_label_map(&path)?;
            let materials = loader::material_labels_by_name(&rows);

            println!("{:>8}  labelName", "labelId");
            for row in materials.iter().take(limit) {
                println!("{:>8}  {}", row.label_id, row.label_name);
            }
            println!("素材ラベル数: {}", materials.len());
        }

        Commands::Inspect { input } => {
            let summary = inspect::summarize_split(&input)?;
            inspect::print_summary(&summary);
        }

        Commands::Config { set_imat_dir, set_warehouse, set_batch_size, set_splits, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(dir) = set_imat_dir {
                config.imat_dir = Some(dir);
                changed = true;
            }
            if let Some(dir) = set_warehouse {
                config.warehouse_dir = Some(dir);
                changed = true;
            }
            if let Some(size) = set_batch_size {
                if size == 0 {
                    return Err(error::ImatError::Config("batch_size は1以上にしてください".into()));
                }
                config.batch_size = size;
                changed = true;
            }
            if let Some(splits) = set_splits {
                config.splits = splits;
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  データセット: {}", config.resolve_imat_dir(None).display());
                println!("  ウェアハウス: {}", config.resolve_warehouse_dir(None).display());
                println!("  バッチサイズ: {}", config.batch_size);
                println!("  split: {}", config.splits.join(", "));
            }
        }
    }

    Ok(())
}
