use crate::error::{ImatError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const IMAT_DIR_ENV_VAR: &str = "IMAT_DIR";
const WAREHOUSE_ENV_VAR: &str = "IMAT_WAREHOUSE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// データセットのフォルダ（label_map_228.xlsx, train.json, validation.json）
    pub imat_dir: Option<PathBuf>,
    /// ウェアハウスのフォルダ
    pub warehouse_dir: Option<PathBuf>,
    /// ロード時のバッチサイズ
    pub batch_size: usize,
    /// ロード対象のsplit
    pub splits: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            if config.batch_size == 0 {
                return Err(ImatError::Config("batch_size は1以上にしてください".into()));
            }
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ImatError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("imat-materials").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            imat_dir: None,
            warehouse_dir: None,
            batch_size: 20_000,
            splits: vec!["train".into(), "validation".into()],
        }
    }

    /// データセットフォルダ（引数 > 環境変数 > 設定ファイル > `imat`）
    pub fn resolve_imat_dir(&self, arg: Option<&Path>) -> PathBuf {
        resolve_dir(arg, IMAT_DIR_ENV_VAR, self.imat_dir.as_deref(), "imat")
    }

    /// ウェアハウスフォルダ（引数 > 環境変数 > 設定ファイル > `warehouse`）
    pub fn resolve_warehouse_dir(&self, arg: Option<&Path>) -> PathBuf {
        resolve_dir(arg, WAREHOUSE_ENV_VAR, self.warehouse_dir.as_deref(), "warehouse")
    }
}

fn resolve_dir(arg: Option<&Path>, env_var: &str, configured: Option<&Path>, fallback: &str) -> PathBuf {
    if let Some(path) = arg {
        return path.to_path_buf();
    }
    // 環境変数を優先
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return PathBuf::from(value);
        }
    }
    configured
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.batch_size, 20_000);
        assert_eq!(config.splits, vec!["train", "validation"]);
        assert!(config.imat_dir.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            imat_dir: Some(PathBuf::from("/data/imat")),
            batch_size: 500,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.imat_dir, Some(PathBuf::from("/data/imat")));
        assert_eq!(loaded.batch_size, 500);
        assert_eq!(loaded.splits, vec!["train", "validation"]);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"splits": ["test"]}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.splits, vec!["test"]);
        assert_eq!(loaded.batch_size, 20_000);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"batch_size": 0}"#).unwrap();

        assert!(matches!(Config::load_from(&path), Err(ImatError::Config(_))));
    }

    #[test]
    fn test_argument_wins_over_config() {
        let config = Config {
            warehouse_dir: Some(PathBuf::from("/from/config")),
            ..Config::default()
        };
        let resolved = config.resolve_warehouse_dir(Some(Path::new("/from/arg")));
        assert_eq!(resolved, PathBuf::from("/from/arg"));
    }
}
