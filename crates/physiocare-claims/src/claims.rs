//! Token payload decoding.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claim decoding errors.
#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid token format: {0}")]
    InvalidFormat(String),
}

pub type ClaimsResult<T> = Result<T, ClaimsError>;

/// Identity claims carried in a session token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// Backend user id
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    /// Login name
    #[serde(default)]
    pub login: Option<String>,
    /// Role string ("patient", "physio", "admin")
    #[serde(default, alias = "rol")]
    pub role: Option<String>,
    /// Expiry as a unix timestamp (seconds)
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Check whether the token is expired at `now` (unix seconds).
    ///
    /// Tokens without an `exp` claim never expire client-side.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.map(|exp| now >= exp).unwrap_or(false)
    }
}

/// Decode the payload segment of a JWT into [`TokenClaims`].
///
/// Accepts an optional `Bearer ` prefix and tolerates `=` padding on the
/// payload segment.
pub fn parse_claims(token: &str) -> ClaimsResult<TokenClaims> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token);

    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ClaimsError::InvalidFormat(
            "expected three dot-separated segments".into(),
        ));
    };

    if payload.is_empty() {
        return Err(ClaimsError::InvalidFormat("empty payload segment".into()));
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: TokenClaims = serde_json::from_slice(&bytes)?;

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_parse_claims() {
        let token = make_token(r#"{"id":"u-1","login":"ana","role":"physio","exp":1700000000}"#);

        let claims = parse_claims(&token).unwrap();
        assert_eq!(claims.id, Some("u-1".to_string()));
        assert_eq!(claims.login, Some("ana".to_string()));
        assert_eq!(claims.role, Some("physio".to_string()));
        assert_eq!(claims.exp, Some(1700000000));
    }

    #[test]
    fn test_parse_claims_rol_alias() {
        let token = make_token(r#"{"_id":"u-2","rol":"patient"}"#);

        let claims = parse_claims(&token).unwrap();
        assert_eq!(claims.id, Some("u-2".to_string()));
        assert_eq!(claims.role, Some("patient".to_string()));
        assert_eq!(claims.login, None);
    }

    #[test]
    fn test_parse_claims_bearer_prefix() {
        let token = format!("Bearer {}", make_token(r#"{"id":"u-3"}"#));
        assert_eq!(parse_claims(&token).unwrap().id, Some("u-3".to_string()));
    }

    #[test]
    fn test_parse_claims_rejects_malformed() {
        assert!(matches!(
            parse_claims("not-a-token"),
            Err(ClaimsError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_claims("a..c"),
            Err(ClaimsError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_claims("a.!!!.c"),
            Err(ClaimsError::Base64(_))
        ));
        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("plain"));
        assert!(matches!(
            parse_claims(&not_json),
            Err(ClaimsError::JsonParse(_))
        ));
    }

    #[test]
    fn test_expiry() {
        let claims = TokenClaims {
            exp: Some(100),
            ..Default::default()
        };
        assert!(!claims.is_expired_at(99));
        assert!(claims.is_expired_at(100));
        assert!(!TokenClaims::default().is_expired_at(i64::MAX));
    }

    proptest::proptest! {
        #[test]
        fn test_parse_claims_never_panics(input in ".*") {
            let _ = parse_claims(&input);
        }
    }
}
