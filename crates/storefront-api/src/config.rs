use config::{builder::DefaultState, Config as ConfigLoader, ConfigBuilder, ConfigError, File};
use serde::Deserialize;
use std::path::Path;

use storefront_recommend::StrategyKind;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub store: StoreConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
    pub logging: LoggingConfig,
    
    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
    #[serde(default)]
    pub openai_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request timeout; streaming turns count against it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    Mongodb,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackendKind,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    Memory,
    Store,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Messages forwarded per turn, system instruction included
    pub max_messages: usize,
    pub session_capacity: usize,
    pub session_ttl_secs: u64,
    pub history: HistoryBackend,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Environment prefixes and the section each one overrides
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("SERVER", "server"),
    ("STORE", "store"),
    ("LLM", "llm"),
    ("CHAT", "chat"),
    ("RECOMMEND", "recommend"),
    ("LOG", "logging"),
];

impl Config {
    /// Load configuration from TOML files and environment variables
    /// 
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_PORT, CHAT_SESSION_TTL_SECS, LOG_FORMAT, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());
        
        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));
        let builder = apply_env_overrides(builder, std::env::vars())?;
        
        let mut cfg: Config = builder.build()?.try_deserialize()?;
        
        // Secrets come from ENV only
        cfg.openai_api_key = required_secret("OPENAI_API_KEY", std::env::var("OPENAI_API_KEY").ok())?;
        if cfg.store.backend == StoreBackendKind::Mongodb {
            cfg.mongodb_uri = required_secret("MONGODB_URI", std::env::var("MONGODB_URI").ok())?;
        }
        
        Ok(cfg)
    }
    
    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()));
        
        let config = builder.build()?;
        config.try_deserialize()
    }
}

/// A secret counts as present only when it has non-blank content
fn required_secret(name: &str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::Message(format!("{} environment variable is required", name)))
}

/// Map `PREFIX_REST` variables onto `section.rest`
fn apply_env_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (name, value) in vars {
        for (prefix, section) in ENV_SECTIONS {
            let Some(rest) = name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('_'))
            else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            let key = format!("{}.{}", section, rest.to_lowercase());
            builder = builder.set_override(key, value.clone())?;
        }
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    
    const TOML: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 3000
        
        [cors]
        enabled = true
        origins = ["http://localhost:3000"]
        
        [store]
        backend = "memory"
        database = "test"
        
        [llm]
        model = "gpt-4o-mini"
        temperature = 0.5
        
        [chat]
        max_messages = 10
        session_capacity = 100
        session_ttl_secs = 60
        history = "store"
        
        [recommend]
        strategy = "feature_mean"
        
        [logging]
        level = "debug"
        format = "json"
    "#;
    
    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(TOML).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.timeout_secs, 300);
        assert_eq!(config.store.backend, StoreBackendKind::Memory);
        assert_eq!(config.chat.history, HistoryBackend::Store);
        assert_eq!(config.recommend.strategy, StrategyKind::FeatureMean);
        assert!(config.llm.base_url.is_none());
    }
    
    #[test]
    fn test_blank_secrets_are_rejected() {
        for value in [None, Some(String::new()), Some("   ".to_string())] {
            let err = required_secret("OPENAI_API_KEY", value).unwrap_err();
            assert!(err.to_string().contains("OPENAI_API_KEY"));
        }
        assert!(required_secret("MONGODB_URI", Some(String::new())).is_err());
        assert_eq!(
            required_secret("MONGODB_URI", Some(" mongodb://localhost:27017 ".to_string())).unwrap(),
            "mongodb://localhost:27017"
        );
    }
    
    #[test]
    fn test_env_overrides_nest_into_sections() {
        let builder = ConfigLoader::builder()
            .add_source(config::File::from_str(TOML, config::FileFormat::Toml));
        let vars = vec![
            ("SERVER_PORT".to_string(), "9000".to_string()),
            ("CHAT_SESSION_TTL_SECS".to_string(), "5".to_string()),
            ("LOG_FORMAT".to_string(), "pretty".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ];
        
        let config: Config = apply_env_overrides(builder, vars)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.chat.session_ttl_secs, 5);
        assert_eq!(config.logging.format, "pretty");
    }
}
