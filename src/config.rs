use crate::ai_provider::AiProvider;
use crate::error::{FoodAiError, Result};
use food_ai_common::FoodCatalog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai_provider: AiProvider,
    /// CLIに渡すモデル名（省略時はCLIのデフォルト）
    pub model: Option<String>,
    pub max_image_size: u32,
    pub top_k: usize,
    pub timeout_seconds: u64,
    /// カスタム食品カタログ（JSON）
    pub catalog_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai_provider: AiProvider::Claude,
            model: None,
            max_image_size: 512,
            top_k: 5,
            timeout_seconds: 60,
            catalog_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;

        // 環境変数を優先
        if let Ok(provider) = std::env::var("FOOD_AI_PROVIDER") {
            config.ai_provider = provider
                .parse()
                .map_err(FoodAiError::Config)?;
        }

        Ok(config)
    }

    /// 指定パスから読み込み（存在しなければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FoodAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("food-ai"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 推論結果キャッシュの置き場所
    pub fn cache_dir() -> Result<PathBuf> {
        match dirs::cache_dir() {
            Some(dir) => Ok(dir.join("food-ai")),
            None => Self::config_dir(),
        }
    }

    /// 食品カタログを読み込み（起動時に一度だけ）
    pub fn load_catalog(&self) -> Result<FoodCatalog> {
        match &self.catalog_path {
            Some(path) => {
                if !path.exists() {
                    return Err(FoodAiError::FileNotFound(path.display().to_string()));
                }
                Ok(FoodCatalog::from_file(path)?)
            }
            None => Ok(FoodCatalog::builtin()),
        }
    }

    pub fn set_catalog_path(&mut self, path: PathBuf) -> Result<()> {
        // 保存前に検証
        FoodCatalog::from_file(&path)?;
        self.catalog_path = Some(path);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_returns_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_image_size, 512);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            ai_provider: AiProvider::Gemini,
            top_k: 3,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(matches!(loaded.ai_provider, AiProvider::Gemini));
        assert_eq!(loaded.top_k, 3);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"top_k": 10}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.top_k, 10);
        assert_eq!(loaded.timeout_seconds, 60);
    }

    #[test]
    fn test_load_catalog_builtin() {
        let catalog = Config::default().load_catalog().unwrap();
        assert!(catalog.find_by_id("rice").is_some());
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let config = Config {
            catalog_path: Some(PathBuf::from("/nonexistent/catalog.json")),
            ..Default::default()
        };
        assert!(matches!(config.load_catalog(), Err(FoodAiError::FileNotFound(_))));
    }
}
