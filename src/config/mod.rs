//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::executor::CountMode;
use crate::core::pagination::DEFAULT_LIMIT;
use crate::core::sort::DEFAULT_SORT_FIELD;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;

/// Environment variable naming the config file when no CLI argument is given
pub const CONFIG_ENV_VAR: &str = "DOCQUERY_CONFIG";

/// Complete application configuration
///
/// Every section is optional in YAML; missing values take their defaults.
///
/// ```yaml
/// server:
///   port: 8080
/// api:
///   prefix: /api/v1
///   collections: [courses, bootcamps]
/// storage:
///   backend: mongodb
///   uri: mongodb://localhost:27017
///   database: devcamper
/// query:
///   default_limit: 25
///   max_limit: 100
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub query: QueryConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid {
                message: format!("bad listen address {}:{}: {}", self.host, self.port, e),
            })
    }
}

/// Route layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Path prefix every collection is mounted under
    pub prefix: String,
    /// Collections exposed over REST
    pub collections: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: "/api/v1".to_string(),
            collections: vec!["courses".to_string()],
        }
    }
}

/// Which document store backs the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process-local store, lost on exit
    #[default]
    Memory,
    /// MongoDB server (requires the `mongodb_backend` feature)
    Mongodb { uri: String, database: String },
}

/// Query translation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size when `limit` is missing or unusable
    pub default_limit: u64,
    /// Upper bound applied to `limit`
    pub max_limit: Option<u64>,
    pub count_mode: CountMode,
    pub sort: SortConfig,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
            count_mode: CountMode::default(),
            sort: SortConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Field sorted newest-first when a request gives no `sort`
    pub default_field: String,
    /// Treat a leading `-` in `sort` as descending
    pub allow_descending_prefix: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            default_field: DEFAULT_SORT_FIELD.to_string(),
            allow_descending_prefix: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            file: file.clone(),
            message: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(file),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { message })
        };

        if self.api.collections.is_empty() {
            return invalid("api.collections must name at least one collection".to_string());
        }
        if !self.api.prefix.is_empty() && !self.api.prefix.starts_with('/') {
            return invalid(format!("api.prefix '{}' must start with '/'", self.api.prefix));
        }

        let mut seen = HashSet::new();
        for name in &self.api.collections {
            if !is_valid_collection_name(name) {
                return invalid(format!("invalid collection name '{}'", name));
            }
            if !seen.insert(name.as_str()) {
                return invalid(format!("collection '{}' is listed twice", name));
            }
        }

        if self.query.default_limit == 0 {
            return invalid("query.default_limit must be positive".to_string());
        }
        if let Some(max) = self.query.max_limit
            && max < self.query.default_limit
        {
            return invalid(format!(
                "query.max_limit ({}) is below query.default_limit ({})",
                max, self.query.default_limit
            ));
        }
        if self.query.sort.default_field.trim().is_empty() {
            return invalid("query.sort.default_field must not be empty".to_string());
        }

        Ok(())
    }
}

/// Collection names become path segments and store collection names
fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with("system.")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
