use crate::rate_limiter::RateLimitConfig;
use mx_expand::{CompletionConfig, FailurePolicy};
use mx_mail::{MailConfig, MailSettings, MailTransportConfig, SmtpSecurity};
use std::{env, path::PathBuf, str::FromStr};

pub const DEFAULT_FROM_ADDRESS: &str = "no-reply@example.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub cors_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
    /// Key the rate limiter on `X-Forwarded-For` / `X-Real-IP` instead of the peer address.
    pub trust_proxy: bool,
    pub completion: CompletionConfig,
    pub failure_policy: FailurePolicy,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "mx_web_api=debug,mx_expand=debug,mx_mail=debug,tower_http=debug".to_string(),
            log_format: LogFormat::Text,
            cors_origins: vec!["*".to_string()],
            rate_limit: RateLimitConfig::default(),
            trust_proxy: false,
            completion: CompletionConfig::default(),
            failure_policy: FailurePolicy::default(),
            mail: MailConfig {
                transport: None,
                settings: MailSettings {
                    from_address: DEFAULT_FROM_ADDRESS.to_string(),
                    ..MailSettings::default()
                },
            },
        }
    }
}

fn parse_or_warn<T>(name: &str, value: &str, fallback: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match value.trim().parse::<T>() {
        Ok(parsed) => parsed,
        Err(_) => {
            eprintln!(
                "Warning: Invalid {} value '{}', using default {}",
                name, value, fallback
            );
            fallback
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = var("MX_HOST") {
            config.host = host;
        }

        if let Some((name, port_str)) = var("MX_PORT")
            .map(|v| ("MX_PORT", v))
            .or_else(|| var("PORT").map(|v| ("PORT", v)))
        {
            config.port = parse_or_warn(name, &port_str, config.port);
        }

        if let Some(log_level) = var("RUST_LOG") {
            config.log_level = log_level;
        } else if let Some(log_level) = var("MX_LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Some(log_format) = var("MX_LOG_FORMAT") {
            config.log_format = match log_format.to_lowercase().as_str() {
                "text" | "plain" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    eprintln!(
                        "Warning: Invalid MX_LOG_FORMAT value '{}', using default text",
                        log_format
                    );
                    LogFormat::Text
                }
            };
        }

        if let Some(cors_origins) = var("MX_CORS_ORIGINS") {
            config.cors_origins = cors_origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Rate limiting configuration
        if let Some(requests_str) = var("MX_RATE_LIMIT_REQUESTS_PER_WINDOW") {
            config.rate_limit.requests_per_window = parse_or_warn(
                "MX_RATE_LIMIT_REQUESTS_PER_WINDOW",
                &requests_str,
                config.rate_limit.requests_per_window,
            );
        }

        if let Some(window_str) = var("MX_RATE_LIMIT_WINDOW_SIZE_SECONDS") {
            config.rate_limit.window_size_seconds = parse_or_warn(
                "MX_RATE_LIMIT_WINDOW_SIZE_SECONDS",
                &window_str,
                config.rate_limit.window_size_seconds,
            );
        }

        if let Some(cleanup_str) = var("MX_RATE_LIMIT_CLEANUP_INTERVAL_SECONDS") {
            config.rate_limit.cleanup_interval_seconds = parse_or_warn(
                "MX_RATE_LIMIT_CLEANUP_INTERVAL_SECONDS",
                &cleanup_str,
                config.rate_limit.cleanup_interval_seconds,
            );
        }

        if let Some(trust_proxy) = var("MX_TRUST_PROXY") {
            match parse_flag(&trust_proxy) {
                Some(flag) => config.trust_proxy = flag,
                None => eprintln!(
                    "Warning: Invalid MX_TRUST_PROXY value '{}', using default false",
                    trust_proxy
                ),
            }
        }

        // Completion provider
        if let Some(api_key) = var("OPENAI_API_KEY") {
            config.completion.api_key = api_key;
        }

        if let Some(api_base) = var("MX_COMPLETION_API_BASE") {
            config.completion.api_base = api_base;
        }

        if let Some(model) = var("MX_COMPLETION_MODEL") {
            config.completion.model = model;
        }

        if let Some(timeout_str) = var("MX_COMPLETION_TIMEOUT_SECONDS") {
            match timeout_str.trim().parse::<u64>() {
                Ok(timeout) => config.completion.timeout_seconds = Some(timeout),
                Err(_) => eprintln!(
                    "Warning: Invalid MX_COMPLETION_TIMEOUT_SECONDS value '{}', leaving timeout unset",
                    timeout_str
                ),
            }
        }

        if let Some(policy) = var("MX_EXPAND_ON_FAILURE") {
            config.failure_policy = parse_or_warn("MX_EXPAND_ON_FAILURE", &policy, config.failure_policy);
        }

        config.mail = mail_config(&var);
        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        if self.port == 80 {
            format!("http://{}", self.host)
        } else if self.port == 443 {
            format!("https://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

// Preview directory wins over an explicit relay, which wins over Gmail.
fn mail_config<F>(var: &F) -> MailConfig
where
    F: Fn(&str) -> Option<String>,
{
    let transport = if let Some(dir) = var("MX_MAIL_PREVIEW_DIR") {
        Some(MailTransportConfig::File {
            dir: PathBuf::from(dir),
        })
    } else if let Some(host) = var("SMTP_HOST") {
        let port = var("SMTP_PORT")
            .map(|port| parse_or_warn("SMTP_PORT", &port, mx_mail::transport::DEFAULT_SMTP_PORT))
            .unwrap_or(mx_mail::transport::DEFAULT_SMTP_PORT);
        let security = match var("SMTP_SECURITY") {
            Some(security) => parse_or_warn_security(&security),
            None if port == 465 => SmtpSecurity::Tls,
            None => SmtpSecurity::StartTls,
        };
        Some(MailTransportConfig::Smtp {
            host,
            port,
            username: var("SMTP_USER"),
            password: var("SMTP_PASS"),
            security,
        })
    } else {
        match (var("EMAIL_USER"), var("EMAIL_PASS")) {
            (Some(user), Some(app_password)) => Some(MailTransportConfig::Gmail { user, app_password }),
            _ => None,
        }
    };

    let defaults = MailSettings::default();
    let settings = MailSettings {
        from_address: var("MX_MAIL_FROM")
            .or_else(|| var("SMTP_USER"))
            .or_else(|| var("EMAIL_USER"))
            .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
        from_name: var("MX_MAIL_FROM_NAME").unwrap_or(defaults.from_name),
        subject: var("MX_MAIL_SUBJECT").unwrap_or(defaults.subject),
        confirm_base_url: var("MX_CONFIRM_BASE_URL").unwrap_or(defaults.confirm_base_url),
    };

    MailConfig {
        transport,
        settings,
    }
}

fn parse_or_warn_security(value: &str) -> SmtpSecurity {
    value.parse::<SmtpSecurity>().unwrap_or_else(|e| {
        eprintln!("Warning: Invalid SMTP_SECURITY value: {}, using starttls", e);
        SmtpSecurity::StartTls
    })
}
