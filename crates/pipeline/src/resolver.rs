//! Session-to-recipient resolution.

use std::time::Duration;

use async_trait::async_trait;
use hostwatch_core::recipient::Recipient;
use hostwatch_core::types::DbId;
use hostwatch_db::models::user::UserContact;
use hostwatch_db::repositories::UserRepo;
use hostwatch_db::DbPool;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Invalid session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Recipient lookup did not finish within {0:?}")]
    Timeout(Duration),
}

/// Maps a session token to the person who should receive alerts.
///
/// `Ok(None)` means the token was valid but names nobody who can be contacted.
#[async_trait]
pub trait RecipientResolver: Send + Sync {
    async fn resolve(&self, session_token: &str) -> Result<Option<Recipient>, ResolveError>;
}

/// Claims read from a session JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The user's database id.
    pub sub: DbId,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Validate an HS256 session token and return its user id.
pub fn decode_user_id(token: &str, secret: &str) -> Result<DbId, ResolveError> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims.sub)
}

/// Resolves HS256 session tokens against the `users` table.
pub struct JwtRecipientResolver {
    pool: DbPool,
    secret: String,
    country_code: String,
}

impl JwtRecipientResolver {
    pub fn new(pool: DbPool, secret: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            pool,
            secret: secret.into(),
            country_code: country_code.into(),
        }
    }
}

fn contact_to_recipient(contact: UserContact, country_code: &str) -> Recipient {
    Recipient {
        display_name: contact.name,
        phone: contact.phone,
        email: contact.email,
        push_token: contact.fcm_token,
    }
    .normalized(country_code)
}

#[async_trait]
impl RecipientResolver for JwtRecipientResolver {
    async fn resolve(&self, session_token: &str) -> Result<Option<Recipient>, ResolveError> {
        let user_id = decode_user_id(session_token, &self.secret)?;
        let contact = UserRepo::find_contact(&self.pool, user_id).await?;

        match contact {
            Some(contact) => Ok(Some(contact_to_recipient(contact, &self.country_code))),
            None => {
                tracing::debug!(user_id, "Session names a user that no longer exists");
                Ok(None)
            }
        }
    }
}
