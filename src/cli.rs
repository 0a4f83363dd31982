use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imat")]
#[command(about = "iMaterialist-Fashion 素材ラベルのステージング・中間テーブル生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// ウェアハウスのフォルダ（省略時は IMAT_WAREHOUSE または設定ファイル）
    #[arg(long, global = true)]
    pub warehouse: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ラベルマップとsplitファイルをrawテーブルにロード
    Load {
        /// データセットフォルダ（省略時は IMAT_DIR または設定ファイル）
        #[arg(long)]
        imat_dir: Option<PathBuf>,

        /// ロードするsplit（複数指定可、省略時は設定ファイルの値）
        #[arg(short, long)]
        split: Vec<String>,

        /// フォルダ直下の *.json をすべてsplitとしてロード
        #[arg(long, conflicts_with = "split")]
        all_splits: bool,

        /// バッチサイズ（一度に書き込む行数）
        #[arg(short, long)]
        batch_size: Option<usize>,
    },

    /// rawテーブルからモデルを実行
    Run,

    /// モデル出力をJSON/Excelに書き出す
    Export {
        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "both")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Excelファイル名（拡張子なし）
        #[arg(short, long, default_value = "imat_materials")]
        title: String,
    },

    /// ラベルマップの素材ラベルを一覧表示
    Materials {
        /// ラベルマップ（省略時はデータセットフォルダの label_map_228.xlsx）
        #[arg(long)]
        label_map: Option<PathBuf>,

        /// データセットフォルダ
        #[arg(long)]
        imat_dir: Option<PathBuf>,

        /// 表示件数
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// splitファイルの中身を確認
    Inspect {
        /// splitファイル（train.json など）
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// データセットフォルダを設定
        #[arg(long)]
        set_imat_dir: Option<PathBuf>,

        /// ウェアハウスのフォルダを設定
        #[arg(long)]
        set_warehouse: Option<PathBuf>,

        /// バッチサイズを設定
        #[arg(long)]
        set_batch_size: Option<usize>,

        /// ロード対象のsplitを設定（カンマ区切り）
        #[arg(long, value_delimiter = ',')]
        set_splits: Option<Vec<String>>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default)]
pub enum ExportFormat {
    Json,
    Excel,
    #[default]
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use json, excel, or both", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Both => write!(f, "both"),
        }
    }
}
