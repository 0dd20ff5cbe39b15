use secrecy::Secret;
use serde::Deserialize;
use service_core::error::AppError;
use service_core::observability::LoggingSettings;

pub const SERVICE_NAME: &str = "invoicing-service";

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Sign-in user created at start-up when missing.
    #[serde(default)]
    pub bootstrap_user: Option<BootstrapUserSettings>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    /// 0 binds a random port (tests).
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_run_migrations() -> bool {
    true
}

#[derive(Deserialize, Clone, Debug)]
pub struct SessionSettings {
    /// Set to true in production with HTTPS.
    #[serde(default)]
    pub secure_cookie: bool,
    #[serde(default = "default_inactivity_hours")]
    pub inactivity_hours: i64,
}

fn default_inactivity_hours() -> i64 {
    24
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            secure_cookie: false,
            inactivity_hours: default_inactivity_hours(),
        }
    }
}

/// Usually supplied through `APP_BOOTSTRAP_USER__EMAIL` and friends.
#[derive(Deserialize, Clone, Debug)]
pub struct BootstrapUserSettings {
    pub name: String,
    pub email: String,
    pub password: Secret<String>,
}

pub fn get_configuration() -> Result<Settings, AppError> {
    service_core::config::load(SERVICE_NAME)
}
