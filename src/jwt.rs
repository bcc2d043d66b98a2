//! JWT token issuance and validation.
//!
//! One codec signs both token classes with the same HS256 secret; access and
//! refresh tokens differ only in lifetime. Expiry is checked against a caller
//! supplied clock rather than inside the JWT library so that an expired but
//! authentic token stays readable (the renewal path depends on that) and so
//! tests can move time without sleeping.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by every token, access and refresh alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,
    /// Issued at (Unix seconds).
    pub iat: u64,
    /// Expiration time (Unix seconds). Always `iat + lifetime`.
    pub exp: u64,
}

/// Configuration for JWT operations, built once at startup from the shared
/// secret and the two configured lifetimes.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

/// Why a token failed verification. The two cases are deliberately distinct:
/// an expired token is authentic and its claims may be trusted for renewal
/// decisions, a malformed one must never be partially trusted.
#[derive(Debug)]
pub enum VerifyError {
    /// Signature or format check failed. No claims are recoverable; corruption
    /// and tampering are indistinguishable by design.
    Malformed,
    /// Signature verified but the token is past its expiry. Claims were
    /// extracted after signature success and are readable.
    Expired(Claims),
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyError::Malformed => write!(f, "token is malformed or forged"),
            VerifyError::Expired(_) => write!(f, "token has expired"),
        }
    }
}

impl std::error::Error for VerifyError {}

/// Errors that can occur while issuing a token or building the config.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token.
    Encoding(jsonwebtoken::errors::Error),
    /// System clock is before the Unix epoch.
    TimeError,
    /// Refresh lifetime must exceed the access lifetime, otherwise a refresh
    /// token issued at login could expire before the first access token does
    /// and silent renewal would never fire.
    RefreshNotLongerThanAccess,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
            JwtError::RefreshNotLongerThanAccess => {
                write!(f, "Refresh token lifetime must exceed access token lifetime")
            }
        }
    }
}

impl std::error::Error for JwtError {}

fn unix_now() -> Result<u64, JwtError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| JwtError::TimeError)?
        .as_secs())
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret and lifetimes.
    /// Rejects configurations where the refresh lifetime does not exceed the
    /// access lifetime; the check happens here so no running process can
    /// violate it.
    pub fn new(
        secret: &[u8],
        access_lifetime: Duration,
        refresh_lifetime: Duration,
    ) -> Result<Self, JwtError> {
        if refresh_lifetime <= access_lifetime {
            return Err(JwtError::RefreshNotLongerThanAccess);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_lifetime,
            refresh_lifetime,
        })
    }

    pub fn access_lifetime(&self) -> Duration {
        self.access_lifetime
    }

    pub fn refresh_lifetime(&self) -> Duration {
        self.refresh_lifetime
    }

    /// Issue a short-lived access token, the per-request credential.
    pub fn issue_access_token(&self, email: &str) -> Result<String, JwtError> {
        self.issue_access_token_at(email, unix_now()?)
    }

    /// Issue a long-lived refresh token, the renewal credential. Never
    /// accepted as a direct request credential.
    pub fn issue_refresh_token(&self, email: &str) -> Result<String, JwtError> {
        self.issue_refresh_token_at(email, unix_now()?)
    }

    pub fn issue_access_token_at(&self, email: &str, now: u64) -> Result<String, JwtError> {
        self.issue_at(email, self.access_lifetime, now)
    }

    pub fn issue_refresh_token_at(&self, email: &str, now: u64) -> Result<String, JwtError> {
        self.issue_at(email, self.refresh_lifetime, now)
    }

    fn issue_at(&self, email: &str, lifetime: Duration, now: u64) -> Result<String, JwtError> {
        let claims = Claims {
            sub: email.to_string(),
            iat: now,
            exp: now + lifetime.as_secs(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Verify a token against the wall clock.
    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let now = unix_now().map_err(|_| VerifyError::Malformed)?;
        self.verify_at(token, now)
    }

    /// Verify a token at an explicit point in time. Signature first: claims
    /// are only looked at once the signature checks out. No leeway window.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims, VerifyError> {
        let claims = self.decode(token)?;
        if now >= claims.exp {
            return Err(VerifyError::Expired(claims));
        }
        Ok(claims)
    }

    /// Extract the subject from any token whose signature verifies, expired
    /// or not. Fails when the token is malformed or forged.
    pub fn subject_of(&self, token: &str) -> Result<String, VerifyError> {
        Ok(self.decode(token)?.sub)
    }

    fn decode(&self, token: &str) -> Result<Claims, VerifyError> {
        // Expiry is handled by the caller; the library only checks the
        // signature and the claim shape here.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;

        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| VerifyError::Malformed)
    }
}
