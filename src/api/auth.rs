//! Bearer-token authentication against the identity provider's signing keys.
//!
//! - The provider's JWKS is fetched once at startup
//!   (`<issuer>/.well-known/jwks.json` unless overridden)
//! - Every protected endpoint requires `Authorization: Bearer <token>`
//! - Tokens are RS256, matched to a signing key by `kid`, and checked for
//!   issuer, audience, and expiry
//! - When `DEV_MODE=true` the gate is bypassed with a sentinel principal

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::routes::AppState;
use crate::config::AuthConfig;

/// Authenticated principal derived from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct Claims {
    /// Subject (stable user identifier)
    sub: String,
    /// Username claim carried by the provider's access tokens
    #[serde(default)]
    username: Option<String>,
}

impl Claims {
    fn into_user(self) -> AuthUser {
        AuthUser {
            username: self.username.unwrap_or(self.sub),
        }
    }
}

/// Signing keys published by the identity provider, keyed by `kid`.
pub struct JwksVerifier {
    keys: HashMap<String, DecodingKey>,
    validation: Validation,
}

impl JwksVerifier {
    /// Fetch the provider's key set and build a verifier. Called once at
    /// startup; there is no key refresh.
    pub async fn from_config(auth: &AuthConfig) -> anyhow::Result<Self> {
        let issuer = auth
            .issuer
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("AUTH_ISSUER must be set when auth is required"))?;
        let jwks_url = auth.jwks_url.clone().unwrap_or_else(|| {
            format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'))
        });
        tracing::info!("Fetching signing keys from {}", jwks_url);
        let jwks: JwkSet = reqwest::get(&jwks_url)
            .await?
            .error_for_status()?
            .json()
            .await?;
        Self::from_jwks(&jwks, issuer, auth.audience.as_deref())
    }

    fn from_jwks(jwks: &JwkSet, issuer: &str, audience: Option<&str>) -> anyhow::Result<Self> {
        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            if let Some(kid) = jwk.common.key_id.clone() {
                keys.insert(kid, DecodingKey::from_jwk(jwk)?);
            }
        }
        if keys.is_empty() {
            anyhow::bail!("JWKS contained no usable signing keys");
        }

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self { keys, validation })
    }

    /// Verify signature, issuer, audience, and expiry; yield the principal.
    fn verify(&self, token: &str) -> anyhow::Result<AuthUser> {
        let header = jsonwebtoken::decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| anyhow::anyhow!("token has no kid header"))?;
        let key = self
            .keys
            .get(&kid)
            .ok_or_else(|| anyhow::anyhow!("no signing key for kid {}", kid))?;
        let data = jsonwebtoken::decode::<Claims>(token, key, &self.validation)?;
        Ok(data.claims.into_user())
    }
}

fn bearer_token(req: &Request<Body>) -> &str {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .unwrap_or("")
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Dev mode => no auth checks.
    if state.config.dev_mode {
        req.extensions_mut().insert(AuthUser {
            username: "dev".to_string(),
        });
        return next.run(req).await;
    }

    // Fail closed if no verifier was built in non-dev mode.
    let verifier = match state.verifier.as_ref() {
        Some(v) => v,
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authenticator not configured",
            )
                .into_response();
        }
    };

    let token = bearer_token(&req);
    if token.is_empty() {
        return (StatusCode::UNAUTHORIZED, "Missing Authorization header").into_response();
    }

    match verifier.verify(token) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("Token verification failed: {}", e);
            (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    fn request_with_auth(value: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/tasks");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        builder.body(Body::empty()).expect("request")
    }

    #[test]
    fn bearer_token_strips_scheme() {
        let req = request_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&req), "abc.def.ghi");
        let req = request_with_auth(Some("bearer lower"));
        assert_eq!(bearer_token(&req), "lower");
    }

    #[test]
    fn bearer_token_rejects_missing_or_malformed_header() {
        let req = request_with_auth(None);
        assert_eq!(bearer_token(&req), "");
        let req = request_with_auth(Some("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&req), "");
    }

    #[test]
    fn principal_prefers_username_over_sub() {
        let claims = Claims {
            sub: "uuid-sub".to_string(),
            username: Some("alice".to_string()),
        };
        assert_eq!(claims.into_user().username, "alice");

        let claims = Claims {
            sub: "uuid-sub".to_string(),
            username: None,
        };
        assert_eq!(claims.into_user().username, "uuid-sub");
    }

    #[test]
    fn empty_jwks_is_rejected() {
        let jwks: JwkSet = serde_json::from_str(r#"{"keys":[]}"#).expect("parse");
        assert!(JwksVerifier::from_jwks(&jwks, "https://issuer.example", None).is_err());
    }
}
