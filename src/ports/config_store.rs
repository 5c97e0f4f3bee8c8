use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    ReadError(String),

    #[error("Failed to write configuration: {0}")]
    WriteError(String),

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Endpoint layout of the task service. Paths differ between server
/// deployments, so they are configuration rather than constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRoutes {
    pub tasks_path: String,
    pub search_path: String,
    pub due_date_param: String,
}

impl Default for ApiRoutes {
    fn default() -> Self {
        Self {
            tasks_path: "tasks".to_string(),
            search_path: "tasks/search".to_string(),
            due_date_param: "due_date".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_token: Option<String>,
    pub base_url: String,
    pub routes: ApiRoutes,
    pub request_timeout_seconds: u64,
    pub retry_count: u32,
    pub search_debounce_ms: u64,
    pub min_search_chars: usize,
    pub splash_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: "http://localhost:8080/api".to_string(),
            routes: ApiRoutes::default(),
            request_timeout_seconds: 30,
            retry_count: 2,
            search_debounce_ms: 400,
            min_search_chars: 3,
            splash_delay_ms: 1500,
        }
    }
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load_config(&self) -> ConfigResult<AppConfig>;
    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()>;
    async fn get_api_token(&self) -> ConfigResult<Option<String>>;
    async fn set_api_token(&self, token: &str) -> ConfigResult<()>;
    async fn clear_api_token(&self) -> ConfigResult<()>;
}
