/// Site configuration, loaded once at cold start and passed to constructors
use crate::constants::{
    DEFAULT_COMMENTS_BY_ID_INDEX, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE,
    DEFAULT_RECAPTCHA_TIMEOUT_MS, DEFAULT_RECAPTCHA_VERIFY_URL, DEFAULT_SMTP_PORT,
    MAX_CURSOR_LIMIT,
};
use crate::error::VowsError;
use crate::models::SortOrder;
use crate::utils::validate_email_address;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub tables: TableConfig,
    pub pagination: PaginationConfig,
    pub captcha: CaptchaConfig,
    pub mail: MailConfig,
    pub comment_topic_arn: String,
    /// Public site root, target of browser redirects
    pub site_base_url: String,
    /// API root, used to build unsubscribe links
    pub api_base_url: String,
}

#[derive(Debug, Clone)]
pub struct TableConfig {
    pub comments: String,
    pub comments_by_id_index: String,
    pub subscriptions: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub default_order: SortOrder,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            default_order: SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaptchaConfig {
    pub enabled: bool,
    pub secret: Option<String>,
    pub verify_url: String,
    /// Minimum reCAPTCHA v3 score; ignored when the response carries none
    pub min_score: Option<f64>,
    pub timeout: Duration,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            secret: None,
            verify_url: DEFAULT_RECAPTCHA_VERIFY_URL.to_string(),
            min_score: None,
            timeout: Duration::from_millis(DEFAULT_RECAPTCHA_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub from: String,
    /// Where contact-form messages go
    pub contact_recipient: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransport {
    Smtp(SmtpConfig),
    Ses,
}

#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Implicit TLS (port 465 style) instead of STARTTLS
    pub secure: bool,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("secure", &self.secure)
            .finish()
    }
}

impl SiteConfig {
    /// Loads configuration from environment variables
    pub fn from_env() -> Result<Self, VowsError> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        tracing::info!("Configuration validated successfully");
        Ok(config)
    }

    /// Loads configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, VowsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| VowsError::Config(format!("Missing {} env var", key)))
        };

        let tables = TableConfig {
            comments: require("COMMENTS_TABLE")?,
            comments_by_id_index: get("COMMENTS_BY_ID_INDEX")
                .unwrap_or_else(|| DEFAULT_COMMENTS_BY_ID_INDEX.to_string()),
            subscriptions: require("SUBSCRIPTIONS_TABLE")?,
        };

        let pagination = PaginationConfig {
            default_page_size: parse_or(get("DEFAULT_PAGE_SIZE"), "DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            max_page_size: parse_or(get("MAX_PAGE_SIZE"), "MAX_PAGE_SIZE", DEFAULT_MAX_PAGE_SIZE)?,
            default_order: match get("DEFAULT_SORT_ORDER") {
                Some(order) => order
                    .parse()
                    .map_err(|_| VowsError::Config(format!("Invalid DEFAULT_SORT_ORDER: {}", order)))?,
                None => SortOrder::Desc,
            },
        };

        let captcha = CaptchaConfig {
            enabled: parse_bool(get("RECAPTCHA_ENABLED"), "RECAPTCHA_ENABLED")?,
            secret: get("RECAPTCHA_SECRET"),
            verify_url: get("RECAPTCHA_VERIFY_URL")
                .unwrap_or_else(|| DEFAULT_RECAPTCHA_VERIFY_URL.to_string()),
            min_score: get("RECAPTCHA_MIN_SCORE")
                .map(|s| {
                    s.parse::<f64>()
                        .map_err(|_| VowsError::Config(format!("Invalid RECAPTCHA_MIN_SCORE: {}", s)))
                })
                .transpose()?,
            timeout: Duration::from_millis(parse_or(
                get("RECAPTCHA_TIMEOUT_MS"),
                "RECAPTCHA_TIMEOUT_MS",
                DEFAULT_RECAPTCHA_TIMEOUT_MS,
            )?),
        };

        let transport = match get("MAIL_TRANSPORT").as_deref().unwrap_or("smtp") {
            "ses" => MailTransport::Ses,
            "smtp" => MailTransport::Smtp(SmtpConfig {
                host: require("SMTP_HOST")?,
                port: parse_or(get("SMTP_PORT"), "SMTP_PORT", DEFAULT_SMTP_PORT)?,
                username: get("SMTP_USERNAME"),
                password: get("SMTP_PASSWORD"),
                secure: parse_bool(get("SMTP_SECURE"), "SMTP_SECURE")?,
            }),
            other => {
                return Err(VowsError::Config(format!(
                    "Invalid MAIL_TRANSPORT '{}', expected 'smtp' or 'ses'",
                    other
                )));
            }
        };

        let mail = MailConfig {
            transport,
            from: require("MAIL_FROM")?,
            contact_recipient: require("CONTACT_RECIPIENT")?,
        };

        let site_base_url = require("SITE_BASE_URL")?.trim_end_matches('/').to_string();
        let api_base_url = get("API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("{}/api", site_base_url));

        let config = Self {
            tables,
            pagination,
            captcha,
            mail,
            comment_topic_arn: require("COMMENT_TOPIC_ARN")?,
            site_base_url,
            api_base_url,
        };

        config
            .validate()
            .map_err(|e| VowsError::Config(format!("Invalid configuration: {}", e)))?;

        Ok(config)
    }

    /// Validates configuration is valid
    pub fn validate(&self) -> Result<(), String> {
        if self.pagination.default_page_size == 0 {
            return Err("DEFAULT_PAGE_SIZE must be > 0".to_string());
        }

        if self.pagination.max_page_size == 0 || self.pagination.max_page_size > MAX_CURSOR_LIMIT {
            return Err(format!("MAX_PAGE_SIZE must be within 1..={}", MAX_CURSOR_LIMIT));
        }

        if self.captcha.enabled && self.captcha.secret.is_none() {
            return Err("RECAPTCHA_SECRET is required when RECAPTCHA_ENABLED is set".to_string());
        }

        if let Some(score) = self.captcha.min_score
            && !(0.0..=1.0).contains(&score)
        {
            return Err(format!("RECAPTCHA_MIN_SCORE must be within 0..=1, got {}", score));
        }

        validate_email_address(&self.mail.from).map_err(|e| e.to_string())?;
        validate_email_address(&self.mail.contact_recipient).map_err(|e| e.to_string())?;

        for (name, value) in [
            ("SITE_BASE_URL", &self.site_base_url),
            ("API_BASE_URL", &self.api_base_url),
            ("RECAPTCHA_VERIFY_URL", &self.captcha.verify_url),
        ] {
            url::Url::parse(value).map_err(|e| format!("Invalid {} '{}': {}", name, value, e))?;
        }

        Ok(())
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, VowsError> {
    match value {
        Some(v) => v
            .parse()
            .map_err(|_| VowsError::Config(format!("Invalid {}: {}", key, v))),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, key: &str) -> Result<bool, VowsError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("false") | Some("0") | Some("no") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some(other) => Err(VowsError::Config(format!("Invalid {}: {}", key, other))),
    }
}
