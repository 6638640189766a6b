use crate::config::JwtConfig;
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Distinguishes short-lived access tokens from refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token id, so two tokens issued in the same second still differ.
    pub jti: Uuid,
    pub typ: TokenKind,
}

impl Claims {
    /// The subject, treating an empty string the same as an absent claim.
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().filter(|s| !s.is_empty())
    }
}

/// An access/refresh token pair as returned by login and refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// Signs and verifies bearer tokens with a shared secret.
///
/// Verification is pure: nothing is looked up and nothing is remembered, so a
/// token stays valid for its whole lifetime once issued.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    access_ttl_minutes: i64,
    refresh_ttl_days: i64,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm: config.algorithm,
            access_ttl_minutes: config.access_ttl_minutes,
            refresh_ttl_days: config.refresh_ttl_days,
        }
    }

    /// Issues an access token for `subject`, valid for the access TTL.
    pub fn issue_access(&self, subject: &str) -> Result<String, AppError> {
        self.issue(subject, TokenKind::Access)
    }

    /// Issues a refresh token for `subject`, valid for the refresh TTL.
    pub fn issue_refresh(&self, subject: &str) -> Result<String, AppError> {
        self.issue(subject, TokenKind::Refresh)
    }

    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue_access(subject)?,
            refresh_token: self.issue_refresh(subject)?,
            token_type: "bearer".into(),
        })
    }

    fn issue(&self, subject: &str, kind: TokenKind) -> Result<String, AppError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => Duration::try_minutes(self.access_ttl_minutes),
            TokenKind::Refresh => Duration::try_days(self.refresh_ttl_days),
        };
        let exp = ttl
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::InternalServerError(format!("{:?} token lifetime is out of range", kind))
            })?;
        let claims = Claims {
            sub: Some(subject.to_string()),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
            typ: kind,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies the signature and expiry of a token of either kind and returns its subject.
    pub fn verify(&self, token: &str) -> Result<String, AppError> {
        let claims = self.decode(token)?;
        claims
            .subject()
            .map(str::to_string)
            .ok_or_else(invalid_credentials)
    }

    /// Like [`verify`](Self::verify), but also requires the token to be of the given kind.
    pub fn verify_kind(&self, token: &str, kind: TokenKind) -> Result<Claims, AppError> {
        let claims = self.decode(token)?;
        if claims.typ != kind {
            log::debug!("expected a {:?} token, got {:?}", kind, claims.typ);
            return Err(invalid_credentials());
        }
        if claims.subject().is_none() {
            return Err(invalid_credentials());
        }
        Ok(claims)
    }

    fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(decode::<Claims>(token, &self.decoding, &validation)?.claims)
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Could not validate credentials".into())
}
