//! tracing_subscriber によるログ初期化

use std::{io::IsTerminal, sync::Once};

use tracing_subscriber::{filter::LevelFilter, EnvFilter};

type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

static IMAT_LOG_ENV_VAR: &str = "IMAT_LOG";

/// ログ出力を初期化する
///
/// `IMAT_LOG` が設定されていればそれを優先し、なければ `verbose` に応じて debug/info。
/// テストからも呼ばれるので `Once` で二重初期化を防ぐ。
/// 初期化に失敗してもコマンドは続行し、stderr に警告だけ出す。
pub fn init(verbose: bool) {
    static INIT: Once = Once::new();
    INIT.call_once(|| match install(verbose) {
        Ok(level) => tracing::debug!("log level: {}", level),
        Err(e) => eprintln!("警告: ログ出力を初期化できません（ログなしで続行）: {}", e),
    });
}

/// グローバルsubscriberを登録する。既に登録済みならエラー。
fn install(verbose: bool) -> Result<LevelFilter, InitError> {
    let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(IMAT_LOG_ENV_VAR)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init()?;

    Ok(default_level)
}
