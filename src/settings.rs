use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ObjectBackend {
    S3,
    Memory,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub project_id: String,

    #[serde(default = "default_document_store")]
    pub document_store: DocumentBackend,

    #[serde(default)]
    pub database_url: String,

    #[serde(default = "default_media_collection")]
    pub default_collection: String,

    #[serde(default = "default_media_collection")]
    pub media_collection: String,

    #[serde(default = "default_wishes_collection")]
    pub wishes_collection: String,

    #[serde(default = "default_object_store")]
    pub object_store: ObjectBackend,

    #[serde(default)]
    pub storage_bucket: String,

    #[serde(default = "default_storage_region")]
    pub storage_region: String,

    #[serde(default)]
    pub storage_endpoint_url: Option<String>,

    #[serde(default)]
    pub storage_access_key_id: String,

    #[serde(default)]
    pub storage_secret_access_key: String,

    #[serde(default)]
    pub storage_public_base_url: Option<String>,

    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: u64,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: String,
}

/// Longest expiry S3 SigV4 presigning accepts.
pub const MAX_SIGNED_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Wedding-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_document_store() -> DocumentBackend {
    DocumentBackend::Postgres
}
fn default_media_collection() -> String {
    "media".to_string()
}
fn default_wishes_collection() -> String {
    "wishes".to_string()
}
fn default_object_store() -> ObjectBackend {
    ObjectBackend::S3
}
fn default_storage_region() -> String {
    "us-east-1".to_string()
}
fn default_signed_url_ttl() -> u64 {
    MAX_SIGNED_URL_TTL_SECS
}
fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}
fn default_cors_origins() -> String {
    "*".to_string()
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .ignore_empty(true)
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        config.validate()?;
        Ok(config)
    }

    /// In-process stores, suitable for tests and local experiments.
    pub fn in_memory(env: AppEnvironment) -> Self {
        AppConfig {
            env,
            name: default_name(),
            port: 0,
            host: default_host(),
            worker_count: 1,
            project_id: "local".to_string(),
            document_store: DocumentBackend::Memory,
            database_url: String::new(),
            default_collection: default_media_collection(),
            media_collection: default_media_collection(),
            wishes_collection: default_wishes_collection(),
            object_store: ObjectBackend::Memory,
            storage_bucket: "local-bucket".to_string(),
            storage_region: default_storage_region(),
            storage_endpoint_url: None,
            storage_access_key_id: String::new(),
            storage_secret_access_key: String::new(),
            storage_public_base_url: None,
            signed_url_ttl_secs: default_signed_url_ttl(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_allowed_origins: default_cors_origins(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.document_store == DocumentBackend::Postgres && self.database_url.trim().is_empty() {
            errors.push("DATABASE_URL cannot be empty when the postgres document store is used");
        }
        if self.object_store == ObjectBackend::S3 && self.storage_bucket.trim().is_empty() {
            errors.push("STORAGE_BUCKET cannot be empty when the s3 object store is used");
        }
        if self.storage_access_key_id.is_empty() != self.storage_secret_access_key.is_empty() {
            errors.push("STORAGE_ACCESS_KEY_ID and STORAGE_SECRET_ACCESS_KEY must be set together");
        }
        if self.signed_url_ttl_secs == 0 || self.signed_url_ttl_secs > MAX_SIGNED_URL_TTL_SECS {
            errors.push("SIGNED_URL_TTL_SECS must be between 1 and 604800");
        }
        if self.max_upload_bytes == 0 {
            errors.push("MAX_UPLOAD_BYTES must be positive");
        }
        if [&self.media_collection, &self.wishes_collection, &self.default_collection]
            .iter()
            .any(|c| c.trim().is_empty())
        {
            errors.push("Collection names cannot be empty");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("project_id", &self.project_id)
            .field("document_store", &self.document_store)
            .field("database_url", &self.database_url.redact())
            .field("default_collection", &self.default_collection)
            .field("media_collection", &self.media_collection)
            .field("wishes_collection", &self.wishes_collection)
            .field("object_store", &self.object_store)
            .field("storage_bucket", &self.storage_bucket)
            .field("storage_region", &self.storage_region)
            .field("storage_endpoint_url", &self.storage_endpoint_url)
            .field("storage_access_key_id", &self.storage_access_key_id.redact())
            .field("storage_secret_access_key", &self.storage_secret_access_key.redact())
            .field("storage_public_base_url", &self.storage_public_base_url)
            .field("signed_url_ttl_secs", &self.signed_url_ttl_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_config_is_valid() {
        assert!(AppConfig::in_memory(AppEnvironment::Testing).validate().is_ok());
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let mut config = AppConfig::in_memory(AppEnvironment::Testing);
        config.document_store = DocumentBackend::Postgres;
        assert!(config.validate().is_err());

        config.database_url = "postgres://localhost/wedding".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_rejects_wildcard_cors() {
        let mut config = AppConfig::in_memory(AppEnvironment::Production);
        assert!(config.validate().is_err());

        config.cors_allowed_origins = "https://wedding.example.com, https://admin.example.com".into();
        assert!(config.validate().is_ok());
        assert_eq!(config.cors_origins().len(), 2);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::in_memory(AppEnvironment::Testing);
        config.storage_access_key_id = "AKIAEXAMPLE".into();
        config.storage_secret_access_key = "super-secret-value".into();

        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret-value"));
        assert!(!printed.contains("AKIAEXAMPLE"));
        assert!(printed.contains("[REDACTED]"));
    }
}
