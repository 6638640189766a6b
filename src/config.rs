use jsonwebtoken::Algorithm;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Error raised when the environment does not describe a usable configuration.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    Missing(&'static str),
    /// A variable is set but its value cannot be used.
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where and how to reach the database.
///
/// Passed explicitly to `PgStore::connect` by every process that needs a pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
        }
    }
}

/// Token signing settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

impl JwtConfig {
    /// HS256 with the default lifetimes of 30 minutes and 7 days.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            access_ttl_minutes: 30,
            refresh_ttl_days: 7,
        }
    }
}

pub struct Config {
    pub database: DatabaseConfig,
    pub server_port: u16,
    pub server_host: String,
    pub jwt: JwtConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let mut database = DatabaseConfig::new(required("DATABASE_URL")?);
        database.max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?;

        let mut jwt = JwtConfig::new(required("JWT_SECRET")?);
        if jwt.secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        jwt.algorithm = parse_algorithm(lookup("JWT_ALGORITHM"))?;
        jwt.access_ttl_minutes = parse_lifetime(
            &lookup,
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            30,
            MAX_ACCESS_TTL_MINUTES,
        )?;
        jwt.refresh_ttl_days =
            parse_lifetime(&lookup, "REFRESH_TOKEN_EXPIRE_DAYS", 7, MAX_REFRESH_TTL_DAYS)?;

        Ok(Self {
            database,
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Longest accepted access token lifetime: one week.
pub const MAX_ACCESS_TTL_MINUTES: i64 = 7 * 24 * 60;
/// Longest accepted refresh token lifetime: one year.
pub const MAX_REFRESH_TTL_DAYS: i64 = 365;

// A lifetime must be positive and no longer than `max`.
fn parse_lifetime<F>(lookup: &F, key: &'static str, default: i64, max: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if (1..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
    }
}

// Only the symmetric HMAC family makes sense with a shared secret.
fn parse_algorithm(value: Option<String>) -> Result<Algorithm, ConfigError> {
    let Some(value) = value else {
        return Ok(Algorithm::HS256);
    };
    match Algorithm::from_str(&value) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(ConfigError::Invalid {
            key: "JWT_ALGORITHM",
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database.url, "postgres://test");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.jwt.algorithm, Algorithm::HS256);
        assert_eq!(config.jwt.access_ttl_minutes, 30);
        assert_eq!(config.jwt.refresh_ttl_days, 7);
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("JWT_ALGORITHM", "HS512"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "5"),
            ("REFRESH_TOKEN_EXPIRE_DAYS", "1"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.jwt.algorithm, Algorithm::HS512);
        assert_eq!(config.jwt.access_ttl_minutes, 5);
        assert_eq!(config.jwt.refresh_ttl_days, 1);
    }

    #[test]
    fn test_config_rejects_missing_and_invalid_values() {
        let missing = Config::from_lookup(lookup_from(&[("JWT_SECRET", "secret")]));
        assert_eq!(missing.err(), Some(ConfigError::Missing("DATABASE_URL")));

        let bad_port = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("SERVER_PORT", "eighty"),
        ]));
        assert!(matches!(
            bad_port.err(),
            Some(ConfigError::Invalid { key: "SERVER_PORT", .. })
        ));

        let asymmetric = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("JWT_ALGORITHM", "RS256"),
        ]));
        assert!(matches!(
            asymmetric.err(),
            Some(ConfigError::Invalid { key: "JWT_ALGORITHM", .. })
        ));
    }

    #[test]
    fn test_config_rejects_out_of_range_lifetimes() {
        for (key, value) in [
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "0"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "-5"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "10081"),
            ("REFRESH_TOKEN_EXPIRE_DAYS", "-1"),
            ("REFRESH_TOKEN_EXPIRE_DAYS", "100000000"),
        ] {
            let result = Config::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://test"),
                ("JWT_SECRET", "secret"),
                (key, value),
            ]));
            assert_eq!(
                result.err(),
                Some(ConfigError::Invalid {
                    key,
                    value: value.to_string()
                }),
                "{}={}",
                key,
                value
            );
        }

        let longest = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
            ("REFRESH_TOKEN_EXPIRE_DAYS", "365"),
        ]))
        .unwrap();
        assert_eq!(longest.jwt.access_ttl_minutes, MAX_ACCESS_TTL_MINUTES);
        assert_eq!(longest.jwt.refresh_ttl_days, MAX_REFRESH_TTL_DAYS);
    }
}
