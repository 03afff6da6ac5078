use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SCORING_TIMEOUT_SECS: u64 = 25;
const DEFAULT_JUDGE_TEMPERATURE: f32 = 0.2;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the scoring service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub judge: JudgeConfig,
    pub scoring: ScoringRuntimeConfig,
    pub webhook_url: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw)?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            judge: JudgeConfig::from_env()?,
            scoring: ScoringRuntimeConfig::from_env()?,
            webhook_url: non_empty_var("RECRUITMENT_WEBHOOK_URL"),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(raw.to_string())),
        }
    }
}

/// Which completion service backs the criterion judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeProvider {
    OpenAi,
    Gemini,
    /// Canned responses, no network. Used by demos and local smoke runs.
    Fixed,
}

impl JudgeProvider {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            "fixed" | "fake" => Ok(Self::Fixed),
            _ => Err(ConfigError::UnknownJudgeProvider(raw.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JudgeProvider::OpenAi => "openai",
            JudgeProvider::Gemini => "gemini",
            JudgeProvider::Fixed => "fixed",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            JudgeProvider::OpenAi => "gpt-4o-mini",
            JudgeProvider::Gemini => "gemini-1.5-flash",
            JudgeProvider::Fixed => "fixed",
        }
    }

    fn api_key_var(&self) -> Option<&'static str> {
        match self {
            JudgeProvider::OpenAi => Some("OPENAI_API_KEY"),
            JudgeProvider::Gemini => Some("GEMINI_API_KEY"),
            JudgeProvider::Fixed => None,
        }
    }
}

/// Connection settings for the LLM judge.
#[derive(Clone)]
pub struct JudgeConfig {
    pub provider: JudgeProvider,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
}

impl JudgeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let provider = match env::var("JUDGE_PROVIDER") {
            Ok(raw) => JudgeProvider::parse(&raw)?,
            Err(_) => JudgeProvider::OpenAi,
        };

        let api_key = match provider.api_key_var() {
            Some(var) => Some(non_empty_var(var).ok_or(ConfigError::MissingApiKey { var })?),
            None => None,
        };

        let model =
            non_empty_var("JUDGE_MODEL").unwrap_or_else(|| provider.default_model().to_string());

        let temperature = match env::var("JUDGE_TEMPERATURE") {
            Ok(raw) => raw
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite() && (0.0..=2.0).contains(value))
                .ok_or_else(|| ConfigError::InvalidTemperature(raw.clone()))?,
            Err(_) => DEFAULT_JUDGE_TEMPERATURE,
        };

        Ok(Self {
            provider,
            model,
            api_key,
            temperature,
        })
    }
}

impl fmt::Debug for JudgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JudgeConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Per-request scoring controls; the skill table itself lives in
/// [`crate::scoring::ScoringConfig`].
#[derive(Debug, Clone)]
pub struct ScoringRuntimeConfig {
    pub timeout: Duration,
    pub skill_based: bool,
    pub config_path: Option<PathBuf>,
}

impl ScoringRuntimeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = match env::var("SCORING_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?,
            Err(_) => DEFAULT_SCORING_TIMEOUT_SECS,
        };

        let skill_based = match env::var("SKILL_BASED_SCORING") {
            Ok(raw) => parse_flag("SKILL_BASED_SCORING", &raw)?,
            Err(_) => true,
        };

        Ok(Self {
            timeout: Duration::from_secs(timeout_secs),
            skill_based,
            config_path: non_empty_var("SCORING_CONFIG_PATH").map(PathBuf::from),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    UnknownJudgeProvider(String),
    MissingApiKey { var: &'static str },
    InvalidTemperature(String),
    InvalidTimeout(String),
    InvalidFlag { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(raw) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json', got '{raw}'")
            }
            ConfigError::UnknownJudgeProvider(raw) => write!(
                f,
                "JUDGE_PROVIDER must be one of openai, gemini, fixed (got '{raw}')"
            ),
            ConfigError::MissingApiKey { var } => {
                write!(f, "{var} must be set for the configured judge provider")
            }
            ConfigError::InvalidTemperature(raw) => {
                write!(f, "JUDGE_TEMPERATURE must be a number in [0, 2], got '{raw}'")
            }
            ConfigError::InvalidTimeout(raw) => write!(
                f,
                "SCORING_TIMEOUT_SECS must be a positive integer, got '{raw}'"
            ),
            ConfigError::InvalidFlag { name } => write!(f, "{name} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
