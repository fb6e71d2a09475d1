//! JWT bearer-token authentication for the streaming WebSocket endpoint.
//!
//! Token may arrive in the `Authorization: Bearer <token>` header or in a
//! `?token=` query parameter; grounded in `original_source`'s
//! `authentication/utils/jwt.py` + `rest_framework_simplejwt` decode/validate
//! flow (signature + expiry check, user id claim extraction).

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::SessionError;

#[derive(Debug, Deserialize)]
struct Claims {
    /// Subject: the authenticated user's id, carried as a string or number
    /// depending on the issuer — accept either.
    #[serde(deserialize_with = "deserialize_user_id")]
    sub: i64,
}

fn deserialize_user_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrInt {
        Str(String),
        Int(i64),
    }
    match StrOrInt::deserialize(deserializer)? {
        StrOrInt::Int(i) => Ok(i),
        StrOrInt::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Extracts the bearer token from either the `Authorization` header value
/// or a raw `token` query-string value.
#[must_use]
pub fn extract_token<'a>(authorization_header: Option<&'a str>, query_token: Option<&'a str>) -> Option<&'a str> {
    authorization_header
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
        .or(query_token)
}

/// Decodes and validates a bearer token, returning the authenticated user
/// id. Any decode/signature/expiry failure is reported as
/// [`SessionError::Auth`] — the transport closes with code 4001 before
/// completing the upgrade.
pub fn authenticate(token: &str, jwt_secret: &str) -> Result<i64, SessionError> {
    let key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::default()).map_err(|_| SessionError::Auth)?;
    Ok(data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct EncodeClaims {
        sub: String,
        exp: usize,
    }

    fn token_for(user_id: &str, secret: &str) -> String {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize;
        encode(
            &Header::default(),
            &EncodeClaims {
                sub: user_id.to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn extracts_token_from_header() {
        assert_eq!(extract_token(Some("Bearer abc"), None), Some("abc"));
    }

    #[test]
    fn extracts_token_from_query_when_header_absent() {
        assert_eq!(extract_token(None, Some("xyz")), Some("xyz"));
    }

    #[test]
    fn header_takes_precedence_over_query() {
        assert_eq!(extract_token(Some("Bearer abc"), Some("xyz")), Some("abc"));
    }

    #[test]
    fn authenticate_accepts_valid_token() {
        let token = token_for("42", "secret");
        assert_eq!(authenticate(&token, "secret"), Ok(42));
    }

    #[test]
    fn authenticate_rejects_wrong_secret() {
        let token = token_for("42", "secret");
        assert!(matches!(
            authenticate(&token, "wrong-secret"),
            Err(SessionError::Auth)
        ));
    }

    #[test]
    fn authenticate_rejects_garbage_token() {
        assert!(matches!(
            authenticate("not-a-jwt", "secret"),
            Err(SessionError::Auth)
        ));
    }
}
