use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public base URL of the blog, without a trailing slash. Post permalinks
    /// and the advertised pingback endpoint are built from it.
    pub canonical_prefix: String,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`
    /// (default: `false`). Enable only behind a reverse proxy that sets them.
    pub trust_proxy_headers: bool,
    /// Inbound/outbound pingback switches and the remote HTTP timeout.
    pub pingback: PingbackSettings,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone)]
pub struct PingbackSettings {
    /// Accept inbound pings (default: `true`).
    pub receive_enabled: bool,
    /// Allow admins to send outbound pings (default: `true`).
    pub send_enabled: bool,
    /// Timeout for fetching sources and contacting remote endpoints (default: `30`).
    pub timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `CANONICAL_PREFIX`         | `http://localhost:3000`    |
    /// | `TRUST_PROXY_HEADERS`      | `false`                    |
    /// | `PINGBACK_RECEIVE_ENABLED` | `true`                     |
    /// | `PINGBACK_SEND_ENABLED`    | `true`                     |
    /// | `PINGBACK_TIMEOUT_SECS`    | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let canonical_prefix = std::env::var("CANONICAL_PREFIX")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let trust_proxy_headers = env_flag("TRUST_PROXY_HEADERS", false);

        let pingback = PingbackSettings {
            receive_enabled: env_flag("PINGBACK_RECEIVE_ENABLED", true),
            send_enabled: env_flag("PINGBACK_SEND_ENABLED", true),
            timeout_secs: std::env::var("PINGBACK_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .expect("PINGBACK_TIMEOUT_SECS must be a valid u64"),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            canonical_prefix,
            trust_proxy_headers,
            pingback,
            jwt,
        }
    }

    /// Absolute URL of the inbound pingback endpoint.
    pub fn pingback_endpoint(&self) -> String {
        format!("{}/pingback", self.canonical_prefix)
    }
}

/// Read a boolean switch. Accepts `true`/`false`/`1`/`0`/`yes`/`no`.
fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => parse_flag(&value)
            .unwrap_or_else(|| panic!("{name} must be a boolean, got '{value}'")),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flag_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
