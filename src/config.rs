use cron::Schedule;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Twitch rejects anything longer than 500 characters; stay well under it.
pub const MAX_MESSAGE_LENGTH: usize = 399;

/// Delay between consecutive parts of a split response.
pub const MESSAGE_INTERVAL: Duration = Duration::from_millis(1000);

pub const DEFAULT_CONTEXT: &str = "You are a helpful Twitch Chatbot.";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the context file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Invalid keep-alive cron expression.
    InvalidCron { expr: String, source: cron::error::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read context file '{}': {}", path.display(), source)
            }
            Self::InvalidCron { expr, source } => {
                write!(f, "invalid cron expression '{}': {}", expr, source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::InvalidCron { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

/// How user input is turned into an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GptMode {
    /// Rolling conversation sent to the chat completions endpoint.
    Chat,
    /// Context file prepended to each input, sent as a single prompt.
    Prompt,
}

impl FromStr for GptMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CHAT" => Ok(Self::Chat),
            "PROMPT" => Ok(Self::Prompt),
            other => Err(ConfigError::Validation(format!(
                "GPT_MODE must be CHAT or PROMPT, got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for GptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => write!(f, "CHAT"),
            Self::Prompt => write!(f, "PROMPT"),
        }
    }
}

pub struct Config {
    pub mode: GptMode,
    /// Number of user/assistant exchanges kept in history.
    pub history_length: usize,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model_name: String,
    /// Model used for free-text prompts in PROMPT mode.
    pub completion_model_name: String,
    /// Bot login, lowercased.
    pub twitch_user: String,
    /// OAuth token without the `oauth:` prefix.
    pub twitch_auth: String,
    /// Trigger keywords, lowercased.
    pub commands: Vec<String>,
    /// Channel logins, lowercased and without `#`.
    pub channels: Vec<String>,
    pub send_username: bool,
    pub enable_tts: bool,
    pub enable_channel_points: bool,
    /// Custom channel-point reward that also counts as a redemption.
    pub channel_points_reward_id: Option<String>,
    pub context_path: PathBuf,
    /// Contents of the context file (or the default context).
    pub context: String,
    pub public_dir: PathBuf,
    pub port: u16,
    pub log_dir: PathBuf,
    pub tts_model: String,
    pub tts_voice: String,
    pub keep_alive_url: Option<String>,
    pub keep_alive_schedule: Schedule,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let mode: GptMode = get_or("GPT_MODE", "CHAT").parse()?;

        let history_raw = get_or("HISTORY_LENGTH", "5");
        let history_length: usize = history_raw.trim().parse().map_err(|_| {
            ConfigError::Validation(format!("HISTORY_LENGTH must be a number, got '{history_raw}'"))
        })?;
        if history_length == 0 {
            return Err(ConfigError::Validation("HISTORY_LENGTH must be at least 1".into()));
        }

        let commands = split_list(&get_or("COMMAND_NAME", "!gpt"), |s| s.to_lowercase());
        if commands.is_empty() {
            return Err(ConfigError::Validation("COMMAND_NAME must contain at least one trigger".into()));
        }

        let channels = split_list(&get_or("CHANNELS", "kayotic_animal"), |s| {
            s.trim_start_matches('#').to_lowercase()
        });
        if channels.is_empty() {
            return Err(ConfigError::Validation("CHANNELS must contain at least one channel".into()));
        }

        let port_raw = get_or("PORT", "3000");
        let port: u16 = port_raw.trim().parse().map_err(|_| {
            ConfigError::Validation(format!("PORT must be a valid port number, got '{port_raw}'"))
        })?;

        let cron_expr = get_or("KEEP_ALIVE_CRON", "0 */14 * * * *");
        let keep_alive_schedule = Schedule::from_str(&cron_expr)
            .map_err(|e| ConfigError::InvalidCron { expr: cron_expr.clone(), source: e })?;

        let context_path = PathBuf::from(get_or("CONTEXT_FILE", "./file_context.txt"));
        let context = load_context(&context_path)?;

        let twitch_auth = get("TWITCH_AUTH")
            .map(|token| token.trim().trim_start_matches("oauth:").to_string())
            .unwrap_or_default();

        Ok(Self {
            mode,
            history_length,
            openai_api_key: get("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: get_or("OPENAI_BASE_URL", "https://api.openai.com")
                .trim_end_matches('/')
                .to_string(),
            model_name: get_or("MODEL_NAME", "gpt-3.5-turbo"),
            completion_model_name: get_or("COMPLETION_MODEL_NAME", "gpt-3.5-turbo-instruct"),
            twitch_user: get("TWITCH_USER").map(|u| u.trim().to_lowercase()).unwrap_or_default(),
            twitch_auth,
            commands,
            channels,
            send_username: is_truthy(&get_or("SEND_USERNAME", "true")),
            enable_tts: is_truthy(&get_or("ENABLE_TTS", "false")),
            enable_channel_points: is_truthy(&get_or("ENABLE_CHANNEL_POINTS", "false")),
            channel_points_reward_id: get("CHANNEL_POINTS_REWARD_ID"),
            context_path,
            context,
            public_dir: PathBuf::from(get_or("PUBLIC_DIR", "public")),
            port,
            log_dir: PathBuf::from(get_or("LOG_DIR", "logs")),
            tts_model: get_or("TTS_MODEL", "tts-1"),
            tts_voice: get_or("TTS_VOICE", "alloy"),
            keep_alive_url: get("KEEP_ALIVE_URL"),
            keep_alive_schedule,
        })
    }

    /// Names of required credentials that were not provided.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.openai_api_key.is_empty() {
            missing.push("OPENAI_API_KEY");
        }
        if self.twitch_user.is_empty() {
            missing.push("TWITCH_USER");
        }
        if self.twitch_auth.is_empty() {
            missing.push("TWITCH_AUTH");
        }
        missing
    }
}

fn is_truthy(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn split_list(raw: &str, normalize: impl Fn(&str) -> String) -> Vec<String> {
    raw.split(',')
        .map(|s| normalize(s.trim()))
        .filter(|s| !s.is_empty())
        .collect()
}

fn load_context(path: &Path) -> Result<String, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Context file {} not found, using default context", path.display());
            Ok(DEFAULT_CONTEXT.to_string())
        }
        Err(e) => Err(ConfigError::ReadFile { path: path.to_path_buf(), source: e }),
    }
}
