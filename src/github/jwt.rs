use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::github::models::Claims;

/// How long an app credential stays valid.
pub const JWT_LIFETIME_SECS: i64 = 300;

/// Signs the short-lived RS256 token that identifies the app itself.
pub fn create_jwt(
    app_id: u64,
    key: &EncodingKey,
    now: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = now.timestamp();
    let claims = Claims {
        iat,
        exp: iat + JWT_LIFETIME_SECS,
        iss: app_id,
    };
    encode(&Header::new(Algorithm::RS256), &claims, key)
}
