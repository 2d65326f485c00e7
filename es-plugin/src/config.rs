//! Configuration types for the Elasticsearch client.

use std::env;
use std::time::Duration;

use tracing::debug;

use crate::errors::EsError;

/// Address used when no address is configured.
pub const DEFAULT_ADDRESS: &str = "http://localhost:9200";

/// Index holding transaction log documents.
pub const DEFAULT_TRANS_LOG_INDEX: &str = "trans_log";

/// Default bound on a whole request, body read included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Connection configuration for the Elasticsearch client.
///
/// Immutable once handed to [`crate::EsClient::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsConfig {
    /// Node URLs, e.g. `https://es-1:9200`. Requests are spread across them.
    pub addresses: Vec<String>,
    /// Basic auth username. Empty disables authentication.
    pub username: String,
    /// Basic auth password.
    pub password: String,
    /// HTTP transport settings.
    pub transport: TransportSettings,
    /// Named indices callers address through this client.
    pub indices: IndexNames,
}

impl Default for EsConfig {
    fn default() -> Self {
        Self {
            addresses: vec![DEFAULT_ADDRESS.to_string()],
            username: String::new(),
            password: String::new(),
            transport: TransportSettings::default(),
            indices: IndexNames::default(),
        }
    }
}

impl EsConfig {
    /// Create a config for the given node addresses with default settings.
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set basic auth credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Replace the transport settings.
    pub fn with_transport(mut self, transport: TransportSettings) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the named indices.
    pub fn with_indices(mut self, indices: IndexNames) -> Self {
        self.indices = indices;
        self
    }

    /// Load configuration from the environment, reading a `.env` file first if present.
    ///
    /// # Environment Variables
    ///
    /// - `ES_ADDRESSES`: comma separated node URLs (default: http://localhost:9200)
    /// - `ES_USERNAME` / `ES_PASSWORD`: basic auth credentials (default: none)
    /// - `ES_TIMEOUT_MS`: request timeout in milliseconds (default: 1000)
    /// - `ES_INSECURE_SKIP_VERIFY`: disable TLS certificate verification (default: false)
    /// - `ES_DISABLE_PROXY`: ignore system proxy settings (default: true)
    /// - `ES_TRANS_LOG_INDEX`: transaction log index name (default: trans_log)
    pub fn from_env() -> Result<Self, EsError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, EsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("ES_ADDRESSES") {
            let addresses: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect();
            if !addresses.is_empty() {
                config.addresses = addresses;
            }
        }
        if let Some(username) = lookup("ES_USERNAME") {
            config.username = username;
        }
        if let Some(password) = lookup("ES_PASSWORD") {
            config.password = password;
        }
        if let Some(raw) = lookup("ES_TIMEOUT_MS") {
            let millis: u64 = raw
                .trim()
                .parse()
                .map_err(|e| EsError::config(format!("Invalid ES_TIMEOUT_MS '{}': {}", raw, e)))?;
            config.transport.timeout = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup("ES_INSECURE_SKIP_VERIFY") {
            config.transport.insecure_skip_verify = parse_flag("ES_INSECURE_SKIP_VERIFY", &raw)?;
        }
        if let Some(raw) = lookup("ES_DISABLE_PROXY") {
            config.transport.disable_proxy = parse_flag("ES_DISABLE_PROXY", &raw)?;
        }
        if let Some(trans_log) = lookup("ES_TRANS_LOG_INDEX") {
            if !trans_log.trim().is_empty() {
                config.indices.trans_log = trans_log.trim().to_string();
            }
        }

        debug!(
            addresses = ?config.addresses,
            timeout_ms = config.transport.timeout.as_millis() as u64,
            insecure_skip_verify = config.transport.insecure_skip_verify,
            "Loaded Elasticsearch configuration"
        );

        Ok(config)
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, EsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(EsError::config(format!("Invalid {} '{}'", key, other))),
    }
}

/// HTTP transport settings applied to every node connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    /// Upper bound for a whole request: connect, response headers, and
    /// reading the body. A response still streaming when it expires is cut off.
    pub timeout: Duration,
    /// Skip TLS certificate verification. Only for clusters with self-signed
    /// certificates you already trust; never the default.
    pub insecure_skip_verify: bool,
    /// Ignore `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub disable_proxy: bool,
}

impl TransportSettings {
    /// Lowest TLS version negotiated. rustls does not implement anything older.
    pub const MIN_TLS_VERSION: &'static str = "1.2";

    /// Settings that accept any server certificate.
    pub fn insecure() -> Self {
        Self {
            insecure_skip_verify: true,
            ..Default::default()
        }
    }

    /// Default settings with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            insecure_skip_verify: false,
            disable_proxy: true,
        }
    }
}

/// Index names used by callers of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNames {
    /// Transaction log index.
    pub trans_log: String,
}

impl Default for IndexNames {
    fn default() -> Self {
        Self {
            trans_log: DEFAULT_TRANS_LOG_INDEX.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EsConfig::default();

        assert_eq!(config.addresses, vec![DEFAULT_ADDRESS.to_string()]);
        assert!(config.username.is_empty());
        assert_eq!(config.transport.timeout, Duration::from_secs(1));
        assert!(!config.transport.insecure_skip_verify);
        assert!(config.transport.disable_proxy);
        assert_eq!(config.indices.trans_log, "trans_log");
    }

    #[test]
    fn test_builder() {
        let config = EsConfig::new(["https://es-1:9200", "https://es-2:9200"])
            .with_credentials("elastic", "changeme")
            .with_transport(TransportSettings::insecure());

        assert_eq!(config.addresses.len(), 2);
        assert_eq!(config.username, "elastic");
        assert_eq!(config.password, "changeme");
        assert!(config.transport.insecure_skip_verify);
        assert_eq!(config.transport.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_from_lookup_empty_uses_defaults() {
        let config = EsConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, EsConfig::default());
    }

    #[test]
    fn test_from_lookup_all_fields() {
        let config = EsConfig::from_lookup(lookup_from(&[
            ("ES_ADDRESSES", "https://a:9200, https://b:9200,,"),
            ("ES_USERNAME", "elastic"),
            ("ES_PASSWORD", "secret"),
            ("ES_TIMEOUT_MS", "2500"),
            ("ES_INSECURE_SKIP_VERIFY", "TRUE"),
            ("ES_DISABLE_PROXY", "0"),
            ("ES_TRANS_LOG_INDEX", "trans_log_v2"),
        ]))
        .unwrap();

        assert_eq!(config.addresses, vec!["https://a:9200", "https://b:9200"]);
        assert_eq!(config.username, "elastic");
        assert_eq!(config.password, "secret");
        assert_eq!(config.transport.timeout, Duration::from_millis(2500));
        assert!(config.transport.insecure_skip_verify);
        assert!(!config.transport.disable_proxy);
        assert_eq!(config.indices.trans_log, "trans_log_v2");
    }

    #[test]
    fn test_from_lookup_invalid_timeout() {
        let result = EsConfig::from_lookup(lookup_from(&[("ES_TIMEOUT_MS", "soon")]));
        assert!(matches!(result, Err(EsError::ConfigError(_))));
    }

    #[test]
    fn test_from_lookup_invalid_flag() {
        let result = EsConfig::from_lookup(lookup_from(&[("ES_INSECURE_SKIP_VERIFY", "maybe")]));
        assert!(matches!(result, Err(EsError::ConfigError(_))));
    }
}
