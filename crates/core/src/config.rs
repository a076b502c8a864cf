use crate::error::QarkResult;
use crate::guard::GuardPolicy;
use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `QARK__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub guard: GuardPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// ─── Mail Config ────────────────────────────────────────────────────────────

/// Transactional email settings. A missing `api_key` is not an error here:
/// every send fails at call time instead.
#[derive(Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_mail_base_url")]
    pub base_url: String,
    #[serde(default = "default_mail_from")]
    pub from: String,
    #[serde(default = "default_mail_to")]
    pub to: Vec<String>,
    #[serde(default = "default_mail_timeout_ms")]
    pub timeout_ms: u64,
}

// Keeps the key out of logs.
impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

// Default functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    4321
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_mail_base_url() -> String {
    "https://api.resend.com".to_string()
}
fn default_mail_from() -> String {
    "QArk Contact <noreply@qark.app>".to_string()
}
fn default_mail_to() -> Vec<String> {
    vec!["contacto@qark.app".to_string()]
}
fn default_mail_timeout_ms() -> u64 {
    10_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_mail_base_url(),
            from: default_mail_from(),
            to: default_mail_to(),
            timeout_ms: default_mail_timeout_ms(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            mail: MailConfig::default(),
            guard: GuardPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `QARK__*` environment variables. The mail
    /// API key also falls back to the provider's conventional
    /// `RESEND_API_KEY`.
    pub fn load() -> QarkResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("QARK")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("mail.to"),
        );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.mail.api_key = resolve_api_key(
            config.mail.api_key.take(),
            std::env::var("RESEND_API_KEY").ok(),
        );
        Ok(config)
    }
}

fn resolve_api_key(configured: Option<String>, fallback: Option<String>) -> Option<String> {
    configured
        .filter(|key| !key.trim().is_empty())
        .or_else(|| fallback.filter(|key| !key.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.http_port, 4321);
        assert_eq!(config.mail.to, vec!["contacto@qark.app".to_string()]);
        assert!(config.mail.api_key.is_none());
        assert_eq!(config.guard.min_form_time_ms, 3000);
        assert_eq!(config.guard.min_message_len, 10);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"api": {"http_port": 8080}, "guard": {"min_form_time_ms": 5000}}"#,
        )
        .unwrap();
        assert_eq!(config.api.http_port, 8080);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.guard.min_form_time_ms, 5000);
        assert_eq!(config.guard.min_message_len, 10);
        assert_eq!(config.mail.base_url, "https://api.resend.com");
    }

    #[test]
    fn test_api_key_fallback() {
        assert_eq!(
            resolve_api_key(Some("re_cfg".into()), Some("re_env".into())),
            Some("re_cfg".to_string())
        );
        assert_eq!(
            resolve_api_key(None, Some("re_env".into())),
            Some("re_env".to_string())
        );
        assert_eq!(
            resolve_api_key(Some("  ".into()), Some("re_env".into())),
            Some("re_env".to_string())
        );
        assert_eq!(resolve_api_key(None, Some(String::new())), None);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mail = MailConfig {
            api_key: Some("re_secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{mail:?}");
        assert!(!rendered.contains("re_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
