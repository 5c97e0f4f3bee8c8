use crate::ports::{ApiRoutes, AppConfig, ConfigError, ConfigResult, ConfigStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

const APP_DIR: &str = "taskpad";
const TOKEN_ENV: &str = "TASKPAD_TOKEN";

/// On-disk settings. The token is never written here.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    base_url: Option<String>,
    tasks_path: Option<String>,
    search_path: Option<String>,
    due_date_param: Option<String>,
    request_timeout_seconds: Option<u64>,
    retry_count: Option<u32>,
    search_debounce_ms: Option<u64>,
    min_search_chars: Option<usize>,
    splash_delay_ms: Option<u64>,
}

impl ConfigFile {
    fn into_config(self, api_token: Option<String>) -> AppConfig {
        let defaults = AppConfig::default();
        let routes = ApiRoutes {
            tasks_path: self.tasks_path.unwrap_or(defaults.routes.tasks_path),
            search_path: self.search_path.unwrap_or(defaults.routes.search_path),
            due_date_param: self.due_date_param.unwrap_or(defaults.routes.due_date_param),
        };

        AppConfig {
            api_token,
            base_url: self.base_url.unwrap_or(defaults.base_url),
            routes,
            request_timeout_seconds: self
                .request_timeout_seconds
                .unwrap_or(defaults.request_timeout_seconds),
            retry_count: self.retry_count.unwrap_or(defaults.retry_count),
            search_debounce_ms: self.search_debounce_ms.unwrap_or(defaults.search_debounce_ms),
            min_search_chars: self.min_search_chars.unwrap_or(defaults.min_search_chars),
            splash_delay_ms: self.splash_delay_ms.unwrap_or(defaults.splash_delay_ms),
        }
    }
}

impl From<&AppConfig> for ConfigFile {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: Some(config.base_url.clone()),
            tasks_path: Some(config.routes.tasks_path.clone()),
            search_path: Some(config.routes.search_path.clone()),
            due_date_param: Some(config.routes.due_date_param.clone()),
            request_timeout_seconds: Some(config.request_timeout_seconds),
            retry_count: Some(config.retry_count),
            search_debounce_ms: Some(config.search_debounce_ms),
            min_search_chars: Some(config.min_search_chars),
            splash_delay_ms: Some(config.splash_delay_ms),
        }
    }
}

pub struct FileConfigStore {
    config_path: PathBuf,
    keyring_service: Option<String>,
}

impl FileConfigStore {
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::ReadError("Cannot determine config directory".to_string())
        })?;

        Ok(Self {
            config_path: config_dir.join(APP_DIR).join("config.json"),
            keyring_service: Some(APP_DIR.to_string()),
        })
    }

    /// Store everything under `dir`, token included, bypassing the OS keyring.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_path: dir.into().join("config.json"),
            keyring_service: None,
        }
    }

    async fn ensure_config_dir(&self) -> ConfigResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }
        Ok(())
    }

    fn token_file_path(&self) -> PathBuf {
        self.config_path.with_file_name(".token")
    }

    fn keyring_entry(&self) -> Option<keyring::Entry> {
        let service = self.keyring_service.as_deref()?;
        match keyring::Entry::new(service, "api_token") {
            Ok(entry) => Some(entry),
            Err(_) => {
                tracing::warn!("Keyring service not available, falling back to file storage");
                None
            }
        }
    }

    async fn get_token_from_file(&self) -> ConfigResult<Option<String>> {
        match fs::read_to_string(self.token_file_path()).await {
            Ok(token) => Ok(Some(token.trim().to_string()).filter(|t| !t.is_empty())),
            Err(_) => Ok(None), // File doesn't exist or can't be read
        }
    }

    async fn set_token_in_file(&self, token: &str) -> ConfigResult<()> {
        self.ensure_config_dir().await?;
        let token_path = self.token_file_path();
        fs::write(&token_path, token)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&token_path)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&token_path, perms)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load_config(&self) -> ConfigResult<AppConfig> {
        let config_file = match fs::read_to_string(&self.config_path).await {
            Ok(content) => serde_json::from_str::<ConfigFile>(&content)
                .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?,
            Err(_) => ConfigFile::default(),
        };

        let mut api_token = self.get_api_token().await?;
        if api_token.is_none() {
            api_token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        }

        Ok(config_file.into_config(api_token))
    }

    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()> {
        self.ensure_config_dir().await?;

        let content = serde_json::to_string_pretty(&ConfigFile::from(config))
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        if let Some(token) = &config.api_token {
            self.set_api_token(token).await?;
        }

        Ok(())
    }

    async fn get_api_token(&self) -> ConfigResult<Option<String>> {
        if let Some(entry) = self.keyring_entry() {
            match entry.get_password() {
                Ok(token) => return Ok(Some(token)),
                Err(keyring::Error::NoEntry) => {}
                Err(_) => {
                    tracing::warn!("Keyring not available, falling back to file storage");
                }
            }
        }

        self.get_token_from_file().await
    }

    async fn set_api_token(&self, token: &str) -> ConfigResult<()> {
        if let Some(entry) = self.keyring_entry() {
            // Only trust the keyring if the token can be read back
            let stored = entry.set_password(token).is_ok()
                && self
                    .keyring_entry()
                    .and_then(|e| e.get_password().ok())
                    .is_some_and(|t| t == token);
            if stored {
                return Ok(());
            }
            tracing::warn!("Failed to store in keyring, falling back to file storage");
        }

        self.set_token_in_file(token).await
    }

    async fn clear_api_token(&self) -> ConfigResult<()> {
        if let Some(entry) = self.keyring_entry() {
            let _ = entry.delete_credential();
        }
        match fs::remove_file(self.token_file_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ConfigError::WriteError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> (FileConfigStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("taskpad-test-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        (FileConfigStore::in_dir(&dir), dir)
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let (store, dir) = temp_store("defaults");
        let config = store.load_config().await.unwrap();
        assert_eq!(config.routes, ApiRoutes::default());
        assert_eq!(config.search_debounce_ms, 400);
        assert_eq!(config.min_search_chars, 3);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn save_then_load_keeps_settings_and_token() {
        let (store, dir) = temp_store("roundtrip");
        let config = AppConfig {
            api_token: Some("secret".to_string()),
            base_url: "https://tasks.example.test".to_string(),
            retry_count: 5,
            ..Default::default()
        };
        store.save_config(&config).await.unwrap();

        let saved = std::fs::read_to_string(dir.join("config.json")).unwrap();
        assert!(!saved.contains("secret"));

        let loaded = store.load_config().await.unwrap();
        assert_eq!(loaded.base_url, "https://tasks.example.test");
        assert_eq!(loaded.retry_count, 5);
        assert_eq!(loaded.api_token.as_deref(), Some("secret"));

        store.clear_api_token().await.unwrap();
        assert_eq!(store.get_api_token().await.unwrap(), None);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn invalid_file_is_reported() {
        let (store, dir) = temp_store("invalid");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.json"), "{ not json").unwrap();
        assert!(matches!(
            store.load_config().await,
            Err(ConfigError::InvalidFormat(_))
        ));
        let _ = std::fs::remove_dir_all(dir);
    }
}
