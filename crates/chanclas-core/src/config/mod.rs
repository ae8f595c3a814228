//! Application configuration with layered loading.
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `CHANCLAS_CONFIG` env var
//!    (default `config/config.toml`)
//! 3. **Environment variables**: `CHANCLAS__*` vars override specific fields,
//!    with `__` as the nesting separator (e.g. `CHANCLAS__SERVER__BIND_PORT`)
//!
//! The secret salt that feeds trait selection lives here deliberately: it is
//! startup-provided state injected into the generator, never an ambient
//! lookup from inside the selection code.
//!
//! Configuration is validated at load time; invalid configurations (empty
//! endpoint pool, malformed URLs, empty salt) return errors rather than
//! failing later mid-request.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on. Must be greater than 0. Defaults to `3000`.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Maximum concurrent in-flight requests. Defaults to `100`.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    3000
}

fn default_max_concurrent_requests() -> usize {
    100
}

/// Chain access settings: the rotating endpoint pool and retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Ordered pool of JSON-RPC endpoint URLs. Cannot be empty. The fetcher
    /// rotates through these round-robin with failover.
    pub rpc_urls: Vec<String>,

    /// Address of the ERC-721 contract exposing `ownerOf` / `getTokenData`.
    pub contract_address: String,

    /// Per-request timeout in seconds. Defaults to `10`.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Base backoff delay in milliseconds; doubles per failed endpoint
    /// attempt within one logical fetch. Defaults to `250`.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

fn default_request_timeout_seconds() -> u64 {
    10
}

fn default_backoff_base_ms() -> u64 {
    250
}

/// Generation inputs: asset locations, output root, and the selection salt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Root directory containing one subdirectory per layer
    /// (`01_Background/`, `02_Quad_UL/`, ...).
    #[serde(default = "default_layers_dir")]
    pub layers_dir: String,

    /// Directory containing one `period_{id}.json` rarity table per
    /// issuance period.
    #[serde(default = "default_rarity_dir")]
    pub rarity_dir: String,

    /// Directory where generated `{id}.png` / `{id}.json` artifacts land.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Process-wide secret combined into the selection seed. Must be
    /// non-empty; changing it changes every future artwork.
    #[serde(default)]
    pub secret_salt: String,
}

fn default_layers_dir() -> String {
    "./layers".to_string()
}

fn default_rarity_dir() -> String {
    "./rarity".to_string()
}

fn default_output_dir() -> String {
    "./output".to_string()
}

/// Collection-level strings baked into every metadata document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Display-name prefix; token 7 becomes `"{name_prefix} #7"`.
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Collection description copied into each metadata document.
    #[serde(default = "default_description")]
    pub description: String,

    /// Base URL for the `external_url` field; the token id is appended.
    #[serde(default = "default_external_url_base")]
    pub external_url_base: String,

    /// Base URL for the `image` field; the token id is appended.
    #[serde(default = "default_image_url_base")]
    pub image_url_base: String,
}

fn default_name_prefix() -> String {
    "Chanclas".to_string()
}

fn default_description() -> String {
    "Chanclas: deterministic generative footwear, minted on a bonding curve.".to_string()
}

fn default_external_url_base() -> String {
    "https://chanclas.fun".to_string()
}

fn default_image_url_base() -> String {
    "https://chanclas.fun/image".to_string()
}

/// Application logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g. "trace", "debug", "info", "warn", "error").
    /// Defaults to `"info"`.
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    pub format: String,
}

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub collection: CollectionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_urls: vec!["http://127.0.0.1:8545".to_string()],
            contract_address: "0x0000000000000000000000000000000000000000".to_string(),
            request_timeout_seconds: default_request_timeout_seconds(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            layers_dir: default_layers_dir(),
            rarity_dir: default_rarity_dir(),
            output_dir: default_output_dir(),
            secret_salt: String::new(),
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_name_prefix(),
            description: default_description(),
            external_url_base: default_external_url_base(),
            image_url_base: default_image_url_base(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            chain: ChainConfig::default(),
            generator: GeneratorConfig::default(),
            collection: CollectionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("server.bind_address", "127.0.0.1")?
            .set_default("server.bind_port", 3000)?
            .set_default("server.max_concurrent_requests", 100)?
            .set_default("chain.request_timeout_seconds", 10)?
            .set_default("chain.backoff_base_ms", 250)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("CHANCLAS").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/config.toml`, overridable via the
    /// `CHANCLAS_CONFIG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CHANCLAS_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
            .parse()
            .map_err(|_| {
                format!(
                    "Invalid socket address: {}:{}",
                    self.server.bind_address, self.server.bind_port
                )
            })
    }

    /// Returns the per-request chain timeout as a [`Duration`].
    #[must_use]
    pub fn chain_request_timeout(&self) -> Duration {
        Duration::from_secs(self.chain.request_timeout_seconds)
    }

    /// Returns the base backoff delay as a [`Duration`].
    #[must_use]
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.chain.backoff_base_ms)
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.chain.rpc_urls.is_empty() {
            return Err("No RPC endpoints configured".to_string());
        }

        for url in &self.chain.rpc_urls {
            if !url.starts_with("http") {
                return Err(format!("Invalid RPC endpoint URL: {url}"));
            }
        }

        if !self.chain.contract_address.starts_with("0x")
            || self.chain.contract_address.len() != 42
        {
            return Err(format!(
                "Invalid contract address: {}",
                self.chain.contract_address
            ));
        }

        if self.generator.secret_salt.is_empty() {
            return Err("generator.secret_salt must be set".to_string());
        }

        if self.chain.backoff_base_ms == 0 {
            return Err("Backoff base must be greater than 0".to_string());
        }

        if self.server.max_concurrent_requests == 0 {
            return Err("Max concurrent requests must be greater than 0".to_string());
        }

        if self.server.bind_port == 0 {
            return Err("Bind port must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
