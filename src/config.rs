use color_eyre::eyre::{eyre, Result};
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://stepik.org";
pub const DEFAULT_REDIRECT_HOST: &str = "127.0.0.1";
pub const DEFAULT_REDIRECT_PORT: u16 = 8912;
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 300;

const TOKEN_PATH: &str = "oauth2/token/";
const AUTHORIZE_PATH: &str = "oauth2/authorize/";
const API_PATH: &str = "api";

pub struct Config {
    pub base_url: String,
    pub redirect_host: String,
    pub redirect_port: u16,
    pub login_timeout: Duration,
    client_id: Option<String>,
    token: Option<SecretString>,
}

impl Config {
    pub fn new(base_url: &str) -> Config {
        Config {
            base_url: base_url.trim_end_matches('/').to_string(),
            redirect_host: DEFAULT_REDIRECT_HOST.to_string(),
            redirect_port: DEFAULT_REDIRECT_PORT,
            login_timeout: Duration::from_secs(DEFAULT_LOGIN_TIMEOUT_SECS),
            client_id: None,
            token: None,
        }
    }

    /// build the configuration from `STEPIK_*` environment variables
    pub fn from_env() -> Config {
        let base_url = match env::var("STEPIK_BASE_URL") {
            Ok(val) => match StepikBaseURL::from(&val) {
                Ok(url) => url,
                Err(e) => {
                    log::warn!("invalid STEPIK_BASE_URL: {}. using default.", e);
                    StepikBaseURL::default()
                }
            },
            Err(_) => StepikBaseURL::default(),
        };

        let mut config = Config::new(&base_url.0);

        if let Ok(host) = env::var("STEPIK_REDIRECT_HOST") {
            if !host.trim().is_empty() {
                config.redirect_host = host.trim().to_string();
            }
        }

        if let Some(port) = parse_env::<u16>("STEPIK_REDIRECT_PORT") {
            config.redirect_port = port;
        }

        if let Some(secs) = parse_env::<u64>("STEPIK_LOGIN_TIMEOUT_SECS") {
            config.login_timeout = Duration::from_secs(secs);
        }

        config.client_id = env::var("STEPIK_CLIENT_ID")
            .ok()
            .filter(|id| !id.trim().is_empty());

        config.token = env::var("STEPIK_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);

        log::debug!("loaded config with base url {}", config.base_url);

        config
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Config {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Config {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    pub fn with_redirect(mut self, host: &str, port: u16) -> Config {
        self.redirect_host = host.to_string();
        self.redirect_port = port;
        self
    }

    pub fn client_id(&self) -> Result<&str> {
        self.client_id
            .as_deref()
            .ok_or_else(|| eyre!("STEPIK_CLIENT_ID is not set"))
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn expose_token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }

    /// the URI Stepik sends the browser back to; served by the local exchange server
    pub fn redirect_uri(&self) -> String {
        format!(
            "http://{}:{}/auth",
            self.redirect_host, self.redirect_port
        )
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/{}", self.base_url, TOKEN_PATH)
    }

    pub fn authorize_endpoint(&self) -> String {
        format!("{}/{}", self.base_url, AUTHORIZE_PATH)
    }

    pub fn api_url(&self) -> String {
        format!("{}/{}", self.base_url, API_PATH)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("invalid {}: {:?}. using default.", key, raw);
            None
        }
    }
}

#[derive(Debug)]
struct StepikBaseURL(String);

impl StepikBaseURL {
    pub fn from(base_url: &str) -> Result<Self, String> {
        // https://*.stepik.org, or a local mock over http(s)
        let pattern = r"^(https://([a-zA-Z0-9-]+\.)*stepik\.org|https?://(localhost|127\.0\.0\.1)(:\d+)?)/?$";

        let re = regex::Regex::new(pattern).map_err(|e| format!("invalid regex pattern: {}", e))?;

        if re.is_match(base_url.trim()) {
            Ok(StepikBaseURL(base_url.trim().trim_end_matches('/').to_string()))
        } else {
            Err("invalid URL: must be https://*.stepik.org or localhost".to_string())
        }
    }
}

impl Default for StepikBaseURL {
    fn default() -> Self {
        StepikBaseURL(DEFAULT_BASE_URL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // env vars are process global
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "STEPIK_BASE_URL",
        "STEPIK_REDIRECT_HOST",
        "STEPIK_REDIRECT_PORT",
        "STEPIK_LOGIN_TIMEOUT_SECS",
        "STEPIK_CLIENT_ID",
        "STEPIK_TOKEN",
    ];

    // run `f` with exactly `vars` set among the STEPIK_* variables, then restore
    fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let originals: Vec<_> = VARS.iter().map(|key| (*key, env::var(key).ok())).collect();

        for key in VARS {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }

        let result = f();

        for (key, original) in originals {
            match original {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }

        result
    }

    #[test]
    fn test_base_url_validation() {
        assert!(StepikBaseURL::from("https://stepik.org").is_ok());
        assert!(StepikBaseURL::from("https://stepik.org/").is_ok());
        assert!(StepikBaseURL::from("https://beta.stepik.org").is_ok());
        assert!(StepikBaseURL::from("http://localhost:8080").is_ok());
        assert!(StepikBaseURL::from("http://127.0.0.1:9000").is_ok());

        assert!(StepikBaseURL::from("http://stepik.org").is_err()); // http not allowed
        assert!(StepikBaseURL::from("https://example.com").is_err());
        assert!(StepikBaseURL::from("https://stepik.org.evil.com").is_err());
        assert!(StepikBaseURL::from("ftp://localhost").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let url = StepikBaseURL::from("https://stepik.org/").unwrap();
        assert_eq!(url.0, "https://stepik.org");
    }

    #[test]
    fn test_defaults_without_env() {
        with_env_vars(&[], || {
            let config = Config::from_env();

            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.redirect_host, DEFAULT_REDIRECT_HOST);
            assert_eq!(config.redirect_port, DEFAULT_REDIRECT_PORT);
            assert_eq!(
                config.login_timeout,
                Duration::from_secs(DEFAULT_LOGIN_TIMEOUT_SECS)
            );
            assert!(!config.has_token());
            assert!(config.client_id().is_err());
        });
    }

    #[test]
    fn test_env_overrides() {
        with_env_vars(
            &[
                ("STEPIK_BASE_URL", "http://localhost:9000"),
                ("STEPIK_REDIRECT_HOST", "localhost"),
                ("STEPIK_REDIRECT_PORT", "9999"),
                ("STEPIK_LOGIN_TIMEOUT_SECS", "10"),
                ("STEPIK_CLIENT_ID", "client-123"),
                ("STEPIK_TOKEN", "secret-token"),
            ],
            || {
                let config = Config::from_env();

                assert_eq!(config.base_url, "http://localhost:9000");
                assert_eq!(config.redirect_uri(), "http://localhost:9999/auth");
                assert_eq!(config.login_timeout, Duration::from_secs(10));
                assert_eq!(config.client_id().unwrap(), "client-123");
                assert_eq!(config.expose_token(), Some("secret-token"));
            },
        );
    }

    #[test]
    fn test_invalid_env_values_fall_back() {
        with_env_vars(
            &[
                ("STEPIK_BASE_URL", "https://invalid.com"),
                ("STEPIK_REDIRECT_PORT", "not-a-port"),
                ("STEPIK_TOKEN", "  "),
            ],
            || {
                let config = Config::from_env();

                assert_eq!(config.base_url, DEFAULT_BASE_URL);
                assert_eq!(config.redirect_port, DEFAULT_REDIRECT_PORT);
                assert!(!config.has_token());
            },
        );
    }

    #[test]
    fn test_endpoints() {
        let config = Config::new("https://stepik.org/");

        assert_eq!(config.token_endpoint(), "https://stepik.org/oauth2/token/");
        assert_eq!(
            config.authorize_endpoint(),
            "https://stepik.org/oauth2/authorize/"
        );
        assert_eq!(config.api_url(), "https://stepik.org/api");
        assert_eq!(config.redirect_uri(), "http://127.0.0.1:8912/auth");
    }

    #[test]
    fn test_builders() {
        let config = Config::new("https://stepik.org")
            .with_redirect("localhost", 4000)
            .with_token("abc");

        assert_eq!(config.redirect_uri(), "http://localhost:4000/auth");
        assert!(config.has_token());
        assert_eq!(config.expose_token(), Some("abc"));
    }
}
