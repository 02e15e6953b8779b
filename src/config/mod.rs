use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Default quiet period before a snapshot write, in milliseconds.
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 2_000;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Everything the binary reads from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub intake: IntakeConfig,
}

impl AppConfig {
    /// Reads `.env` when present, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: AppEnvironment::parse(&var_or("APP_ENV", "development")),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig::from_env(),
            intake: IntakeConfig::from_env()?,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("APP_PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            Err(_) => DEFAULT_PORT,
        };
        Ok(Self {
            host: var_or("APP_HOST", DEFAULT_HOST),
            port,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::from([127, 0, 0, 1])
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost { source })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl TelemetryConfig {
    fn from_env() -> Self {
        Self {
            log_level: var_or("APP_LOG_LEVEL", DEFAULT_LOG_LEVEL),
        }
    }
}

/// Where intake snapshots and uploads live and how eagerly snapshots are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Root for `sessions/` and `uploads/`. `None` keeps both in memory.
    pub store_dir: Option<PathBuf>,
    pub save_debounce: Duration,
}

impl IntakeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let store_dir = env::var("INTAKE_STORE_DIR")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);
        let save_debounce = match env::var("INTAKE_SAVE_DEBOUNCE_MS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(millis) => Duration::from_millis(millis),
                Err(_) => return Err(ConfigError::InvalidDebounce { value: raw }),
            },
            Err(_) => Duration::from_millis(DEFAULT_SAVE_DEBOUNCE_MS),
        };
        Ok(Self {
            store_dir,
            save_debounce,
        })
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            save_debounce: Duration::from_millis(DEFAULT_SAVE_DEBOUNCE_MS),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDebounce { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort => f.write_str("APP_PORT must be a port number between 0 and 65535"),
            Self::InvalidHost { .. } => f.write_str("APP_HOST must be `localhost` or an IP address"),
            Self::InvalidDebounce { value } => write!(
                f,
                "INTAKE_SAVE_DEBOUNCE_MS must be a whole number of milliseconds, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidHost { source } => Some(source),
            Self::InvalidPort | Self::InvalidDebounce { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    const KEYS: [&str; 6] = [
        "APP_ENV",
        "APP_HOST",
        "APP_PORT",
        "APP_LOG_LEVEL",
        "INTAKE_STORE_DIR",
        "INTAKE_SAVE_DEBOUNCE_MS",
    ];

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn with_env<T>(vars: &[(&str, &str)], check: impl FnOnce() -> T) -> T {
        let _lock = env_guard().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for key in KEYS {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = check();
        for key in KEYS {
            env::remove_var(key);
        }
        result
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let config = with_env(&[], || AppConfig::load().expect("config loads with defaults"));
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.intake, IntakeConfig::default());
    }

    #[test]
    fn reads_intake_store_settings() {
        let config = with_env(
            &[
                ("APP_ENV", "prod"),
                ("INTAKE_STORE_DIR", " /var/lib/fleet-intake "),
                ("INTAKE_SAVE_DEBOUNCE_MS", "250"),
            ],
            || AppConfig::load().expect("config loads"),
        );
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.intake.store_dir, Some(PathBuf::from("/var/lib/fleet-intake")));
        assert_eq!(config.intake.save_debounce, Duration::from_millis(250));
    }

    #[test]
    fn blank_store_dir_keeps_snapshots_in_memory() {
        let config = with_env(&[("INTAKE_STORE_DIR", "   ")], || {
            AppConfig::load().expect("config loads")
        });
        assert_eq!(config.intake.store_dir, None);
    }

    #[test]
    fn rejects_non_numeric_debounce_and_port() {
        match with_env(&[("INTAKE_SAVE_DEBOUNCE_MS", "soon")], AppConfig::load) {
            Err(ConfigError::InvalidDebounce { value }) => assert_eq!(value, "soon"),
            other => panic!("expected invalid debounce, got {other:?}"),
        }
        match with_env(&[("APP_PORT", "70000")], AppConfig::load) {
            Err(ConfigError::InvalidPort) => {}
            other => panic!("expected invalid port, got {other:?}"),
        }
    }

    #[test]
    fn accepts_localhost_host() {
        let config = with_env(&[("APP_HOST", "localhost"), ("APP_PORT", "8088")], || {
            AppConfig::load().expect("config loads")
        });
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8088));
    }
}
