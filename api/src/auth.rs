use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{Db, DbError};

pub const ACCESS_TOKEN_ISSUER: &str = "chirpy-access";
pub const REFRESH_TOKEN_ISSUER: &str = "chirpy-refresh";

/// The issuer claim doubles as the token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn issuer(self) -> &'static str {
        match self {
            TokenKind::Access => ACCESS_TOKEN_ISSUER,
            TokenKind::Refresh => REFRESH_TOKEN_ISSUER,
        }
    }

    pub fn lifetime(self) -> Duration {
        match self {
            TokenKind::Access => Duration::hours(1),
            TokenKind::Refresh => Duration::days(60),
        }
    }

    pub fn from_issuer(issuer: &str) -> Option<Self> {
        match issuer {
            ACCESS_TOKEN_ISSUER => Some(TokenKind::Access),
            REFRESH_TOKEN_ISSUER => Some(TokenKind::Refresh),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String, // Subject (user ID)
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    pub fn kind(&self) -> Option<TokenKind> {
        TokenKind::from_issuer(&self.iss)
    }

    pub fn user_id(&self) -> Result<u64, AuthError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::BadSubject(self.sub.clone()))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad signature, malformed token or expired.
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Expected a {expected} token")]
    WrongKind { expected: TokenKind },

    #[error("Token has been revoked")]
    Revoked,

    #[error("Token subject is not a user id: {0}")]
    BadSubject(String),

    #[error("Token creation failed: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] DbError),
}

/// Issues and checks access/refresh tokens signed with HMAC-SHA256.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    db: Db,
}

impl TokenService {
    pub fn new(secret: &str, db: Db) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            db,
        }
    }

    pub fn issue(&self, kind: TokenKind, user_id: u64) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            iss: kind.issuer().to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + kind.lifetime()).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    /// Checks signature and expiry and returns the decoded claims.
    pub fn parse_and_verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode(token, true)
    }

    /// Like [`parse_and_verify`](Self::parse_and_verify) but also requires `expected` kind.
    pub fn verify_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let claims = self.parse_and_verify(token)?;
        if claims.kind() != Some(expected) {
            return Err(AuthError::WrongKind { expected });
        }
        Ok(claims)
    }

    /// Trades a live, unrevoked refresh token for a new access token.
    /// The refresh token itself stays valid.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.verify_kind(refresh_token, TokenKind::Refresh)?;
        if self.db.is_token_revoked(refresh_token).await? {
            return Err(AuthError::Revoked);
        }
        self.issue(TokenKind::Access, claims.user_id()?)
    }

    /// Adds a refresh token to the revocation ledger.
    ///
    /// The signature must check out, but an expired refresh token is still
    /// accepted.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self.decode(refresh_token, false)?;
        if claims.kind() != Some(TokenKind::Refresh) {
            return Err(AuthError::WrongKind {
                expected: TokenKind::Refresh,
            });
        }
        self.db.revoke_token(refresh_token).await?;
        Ok(())
    }

    fn decode(&self, token: &str, check_expiry: bool) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = check_expiry;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}
