use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Feed parsing failed: {0}")]
    FeedParseError(#[from] feed_rs::parser::ParseFeedError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("Request to {url} timed out after {seconds}s")]
    TimeoutError { url: String, seconds: u64 },

    #[error("Missing API credential: environment variable {env_var} is not set")]
    MissingCredentialError { env_var: String },

    #[error("Completion response was unusable: {message}")]
    CompletionError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Feed,
    Credential,
    Completion,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 單一信源失敗，可略過
    Low,
    /// 摘要失敗，仍可發布佔位頁面
    Medium,
    /// 無法發布頁面
    High,
    /// 配置錯誤，程式無法啟動
    Critical,
}

impl DigestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DigestError::HttpError(_)
            | DigestError::HttpStatusError { .. }
            | DigestError::TimeoutError { .. } => ErrorCategory::Network,
            DigestError::FeedParseError(_) => ErrorCategory::Feed,
            DigestError::MissingCredentialError { .. } => ErrorCategory::Credential,
            DigestError::CompletionError { .. } | DigestError::SerializationError(_) => {
                ErrorCategory::Completion
            }
            DigestError::IoError(_) => ErrorCategory::Storage,
            DigestError::ConfigError { .. }
            | DigestError::ConfigValidationError { .. }
            | DigestError::InvalidConfigValueError { .. }
            | DigestError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Feed => ErrorSeverity::Low,
            ErrorCategory::Credential | ErrorCategory::Completion => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DigestError::HttpError(_) | DigestError::HttpStatusError { .. } => {
                "Check network connectivity and that the URL is still served".to_string()
            }
            DigestError::TimeoutError { .. } => {
                "Raise the timeout or drop the unresponsive source".to_string()
            }
            DigestError::FeedParseError(_) => {
                "Verify the source still publishes a valid RSS or Atom document".to_string()
            }
            DigestError::MissingCredentialError { env_var } => {
                format!("Export {} before running", env_var)
            }
            DigestError::CompletionError { .. } | DigestError::SerializationError(_) => {
                "Check the API base URL, model name and account quota".to_string()
            }
            DigestError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            DigestError::ConfigError { .. }
            | DigestError::ConfigValidationError { .. }
            | DigestError::InvalidConfigValueError { .. }
            | DigestError::MissingConfigError { .. } => {
                "Fix the configuration file and run again (try --dry-run)".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach a remote service: {}", self),
            ErrorCategory::Feed => format!("A feed could not be read: {}", self),
            ErrorCategory::Credential => format!("No API key available: {}", self),
            ErrorCategory::Completion => format!("Summarization failed: {}", self),
            ErrorCategory::Storage => format!("The page could not be written: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }

    /// 只有在完全沒有發布頁面時才會走到這裡，因此永遠非零
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Critical => 2,
            _ => 1,
        }
    }

    pub(crate) fn from_request(url: &str, timeout_seconds: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DigestError::TimeoutError {
                url: url.to_string(),
                seconds: timeout_seconds,
            }
        } else {
            DigestError::HttpError(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;
