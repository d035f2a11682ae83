use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    pub trust: TrustSettings,
    pub auth_gateway: AuthGatewaySettings,
    #[serde(default)]
    pub routes: RouteSettings,
    #[serde(default)]
    pub router: RouterSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint (e.g., http://tempo:4317). Export is disabled when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Partner origins allowed to talk to this page.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct TrustSettings {
    /// Exact origins, compared byte for byte (e.g., https://msk-superbio.com).
    #[serde(default)]
    pub exact_origins: Vec<String>,
    /// Root domains whose https subdomains are trusted (e.g., msk-superbio.com).
    #[serde(default)]
    pub wildcard_domains: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AuthGatewaySettings {
    /// Base URL of the backend that owns the session (e.g., http://localhost:5001).
    pub url: String,
    #[serde(default = "default_token_login_path")]
    pub token_login_path: String,
    /// Request timeout for the token exchange. No timeout when unset.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_token_login_path() -> String {
    "/auth/token-login".to_string()
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RouteSettings {
    /// Where the page goes once a token exchange is confirmed.
    #[serde(default = "default_landing_route")]
    pub landing: String,
    #[serde(default = "default_dashboard_route")]
    pub dashboard: String,
    #[serde(default = "default_logout_route")]
    pub logout: String,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            landing: default_landing_route(),
            dashboard: default_dashboard_route(),
            logout: default_logout_route(),
        }
    }
}

fn default_landing_route() -> String {
    "/".to_string()
}

fn default_dashboard_route() -> String {
    "/stats".to_string()
}

fn default_logout_route() -> String {
    "/auth/logout".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct RouterSettings {
    /// Disable for logout-only embeddings where another page owns the login handshake.
    #[serde(default = "default_handles_auth")]
    pub handles_auth: bool,
    /// Disable for logout-only embeddings that must not navigate to the dashboard.
    #[serde(default = "default_handles_auth_redirect")]
    pub handles_auth_redirect: bool,
    #[serde(default = "default_confirmation_delay_ms")]
    pub confirmation_delay_ms: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_page_channel_capacity")]
    pub page_channel_capacity: usize,
}

impl RouterSettings {
    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            handles_auth: default_handles_auth(),
            handles_auth_redirect: default_handles_auth_redirect(),
            confirmation_delay_ms: default_confirmation_delay_ms(),
            queue_capacity: default_queue_capacity(),
            page_channel_capacity: default_page_channel_capacity(),
        }
    }
}

fn default_handles_auth() -> bool {
    true
}

fn default_handles_auth_redirect() -> bool {
    true
}

fn default_confirmation_delay_ms() -> u64 {
    5000
}

fn default_queue_capacity() -> usize {
    256
}

fn default_page_channel_capacity() -> usize {
    64
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Cannot read current directory: {}", e)))?;

    // Running from the workspace root or from inside the crate both work
    let configuration_directory = if base_path.ends_with("partner-bridge") {
        base_path.join("config")
    } else {
        base_path.join("partner-bridge").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
