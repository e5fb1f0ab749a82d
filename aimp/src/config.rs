use std::time::Duration;

/// Default path of the JSON-RPC endpoint served by the control plugin.
pub const DEFAULT_RPC_PATH: &str = "/RPC_JSON";

/// Default plugin address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3333";

/// How method names are spelled on the wire.
///
/// The plugin changed naming between server versions, so the client has to
/// be told which one it talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodNaming {
    /// `get_control_panel_state`
    #[default]
    SnakeCase,
    /// `GetControlPanelState`
    PascalCase,
}

impl MethodNaming {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "snake" | "snake_case" | "snakecase" => Ok(MethodNaming::SnakeCase),
            "pascal" | "pascal_case" | "pascalcase" => Ok(MethodNaming::PascalCase),
            other => Err(format!("unknown method naming '{}'", other)),
        }
    }
}

/// Configuration for connecting to the control plugin
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme, host and port of the plugin, e.g. `http://192.168.1.20:3333`
    pub base_url: String,
    /// Path of the JSON-RPC endpoint
    pub rpc_path: String,
    /// Timeout for ordinary calls
    pub request_timeout: Duration,
    /// Timeout for long-poll subscriptions; `None` waits indefinitely
    pub subscription_timeout: Option<Duration>,
    /// Wire spelling of method names
    pub naming: MethodNaming,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            rpc_path: DEFAULT_RPC_PATH.to_string(),
            request_timeout: Duration::from_secs(10),
            subscription_timeout: None,
            naming: MethodNaming::SnakeCase,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Build a configuration from `AIMP_URL`, `AIMP_RPC_PATH`,
    /// `AIMP_TIMEOUT_SECS` and `AIMP_METHOD_NAMING`, using defaults for
    /// unset variables.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("AIMP_URL") {
            config.base_url = url;
        }
        if let Ok(path) = std::env::var("AIMP_RPC_PATH") {
            config.rpc_path = path;
        }
        if let Ok(secs) = std::env::var("AIMP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| format!("AIMP_TIMEOUT_SECS must be a number of seconds, got '{}'", secs))?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(naming) = std::env::var("AIMP_METHOD_NAMING") {
            config.naming = MethodNaming::parse(&naming)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_rpc_path(mut self, path: impl Into<String>) -> Self {
        self.rpc_path = path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_subscription_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.subscription_timeout = timeout;
        self
    }

    pub fn with_naming(mut self, naming: MethodNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Full URL requests are posted to.
    pub fn endpoint_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.rpc_path.starts_with('/') {
            format!("{}{}", base, self.rpc_path)
        } else {
            format!("{}/{}", base, self.rpc_path)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            ));
        }

        if self.rpc_path.trim().is_empty() {
            return Err("RPC path cannot be empty".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("request timeout must be greater than zero".to_string());
        }

        if let Some(timeout) = self.subscription_timeout {
            if timeout.is_zero() {
                return Err("subscription timeout must be greater than zero".to_string());
            }
        }

        Ok(())
    }
}
