use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const TOKEN_LIFETIME_HOURS: i64 = 6;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id, stringified.
    sub: String,
    exp: i64,
}

pub fn create_access_token(user_id: i32, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates signature and expiry, then parses the subject back into a
/// user id. Any failure collapses to `None`; callers only need to know
/// the token is unusable.
pub fn decode_user_id(token: &str, secret: &str) -> Option<i32> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;
    data.claims.sub.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let token = create_access_token(42, "secret").unwrap();
        assert_eq!(decode_user_id(&token, "secret"), Some(42));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_access_token(42, "secret").unwrap();
        assert_eq!(decode_user_id(&token, "other"), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: "42".to_string(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert_eq!(decode_user_id(&token, "secret"), None);
    }

    #[test]
    fn non_numeric_subject_is_rejected() {
        #[derive(Serialize)]
        struct BadClaims {
            sub: String,
            exp: i64,
        }
        let claims = BadClaims {
            sub: "alice".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert_eq!(decode_user_id(&token, "secret"), None);
    }
}
