use anyhow::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub wac: WacConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub dpop: DpopConfig,
}

/// Tunables for DPoP proof validation.
#[derive(Debug, Clone, Deserialize)]
pub struct DpopConfig {
    /// Leeway applied to `iat`, `nbf` and `exp`.
    pub clock_skew_seconds: i64,
    /// How long a `(jti, uri)` pair is remembered for replay detection.
    pub jti_window_seconds: i64,
    /// Require the `ath` claim to match the presented access token.
    pub verify_access_token_hash: bool,
}

impl Default for DpopConfig {
    fn default() -> Self {
        Self {
            clock_skew_seconds: 60,
            jti_window_seconds: 600,
            verify_access_token_hash: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WacConfig {
    /// Public URL the Pod storage is mounted at, e.g. `https://pod.example/storage`.
    pub base_url: String,
    /// Request origins that bypass `acl:origin` checks.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Local directory served as the Pod by the bundled server.
    pub root_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub serve_origin: Option<String>,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the server address as a string in the format "host:port".
    #[must_use]
    pub fn serve_origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// ## Summary
    /// Returns the server origin URL.
    #[must_use]
    pub fn origin(&self) -> String {
        if let Some(origin) = &self.serve_origin {
            origin.trim_end_matches('/').to_string()
        } else {
            self.serve_origin()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8698)?
            .set_default("database.max_connections", 4)?
            .set_default("logging.level", "debug")?
            .set_default("auth.dpop.clock_skew_seconds", 60)?
            .set_default("auth.dpop.jti_window_seconds", 600)?
            .set_default("auth.dpop.verify_access_token_hash", false)?
            .set_default("wac.base_url", "http://localhost:8698")?
            .set_default("wac.allowed_origins", Vec::<String>::new())?
            .set_default("wac.root_dir", "./pod")?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("wac.allowed_origins"),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(base_url = %settings.wac.base_url, "Configuration loaded");
    Ok(settings)
}
