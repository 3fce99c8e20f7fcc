use core_config::{env_optional, env_parse, env_required, ConfigError, FromEnv};
use std::fmt;

/// Default request timeout for the reqwest client, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Mandrill transport configuration
#[derive(Clone)]
pub struct MandrillConfig {
    pub api_key: String,
    /// Endpoint host override, `mandrillapp.com` when unset
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_secs: u64,
}

impl MandrillConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            host: None,
            port: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FromEnv for MandrillConfig {
    /// Reads:
    /// - `MANDRILL_API_KEY` (required)
    /// - `MANDRILL_HOST`
    /// - `MANDRILL_PORT`
    /// - `MANDRILL_TIMEOUT_SECS` (defaults to 30)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_required("MANDRILL_API_KEY")?,
            host: env_optional("MANDRILL_HOST"),
            port: env_parse("MANDRILL_PORT")?,
            timeout_secs: env_parse("MANDRILL_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}

impl fmt::Debug for MandrillConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MandrillConfig")
            .field("api_key", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
