use async_trait::async_trait;
use dashmap::DashMap;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Verified caller identity, attached to each authenticated request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub groups: Vec<String>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.groups.iter().any(|g| g == "admin")
    }
}

/// Single undifferentiated verification failure. Whether the signature was
/// bad, the token expired, or the key fetch failed is never exposed.
#[derive(Error, Debug)]
#[error("Invalid or expired token")]
pub struct AuthError;

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: String,
    #[serde(rename = "cognito:groups", default = "default_groups")]
    groups: Vec<String>,
}

fn default_groups() -> Vec<String> {
    vec!["user".to_string()]
}

#[derive(Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Deserialize)]
struct Jwk {
    #[serde(default)]
    kty: String,
    kid: String,
    n: String,
    e: String,
}

/// RS256 verifier against the issuer's JWKS endpoint. Signing keys are
/// cached by `kid`; an unknown `kid` triggers one refresh of the set.
pub struct JwksVerifier {
    issuer: String,
    jwks_url: String,
    http: reqwest::Client,
    keys: DashMap<String, DecodingKey>,
}

impl JwksVerifier {
    pub fn new(issuer: String) -> Self {
        let jwks_url = format!("{}/.well-known/jwks.json", issuer);
        Self {
            issuer,
            jwks_url,
            http: reqwest::Client::new(),
            keys: DashMap::new(),
        }
    }

    async fn signing_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.keys.get(kid) {
            return Ok(key.value().clone());
        }

        self.refresh_keys().await?;
        self.keys
            .get(kid)
            .map(|k| k.value().clone())
            .ok_or(AuthError)
    }

    async fn refresh_keys(&self) -> Result<(), AuthError> {
        let set: JwkSet = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                warn!("JWKS fetch failed: {}", e);
                AuthError
            })?
            .json()
            .await
            .map_err(|e| {
                warn!("JWKS parse failed: {}", e);
                AuthError
            })?;

        for jwk in set.keys {
            if jwk.kty != "RSA" {
                continue;
            }
            if let Ok(key) = DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                self.keys.insert(jwk.kid, key);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl IdentityVerifier for JwksVerifier {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        let header = decode_header(credential).map_err(|_| AuthError)?;
        let kid = header.kid.ok_or(AuthError)?;
        let key = self.signing_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_aud = false;

        let data = decode::<Claims>(credential, &key, &validation).map_err(|e| {
            warn!("Token verification failed: {}", e);
            AuthError
        })?;

        Ok(Identity {
            id: data.claims.sub,
            email: data.claims.email,
            groups: data.claims.groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin() {
        let admin = Identity {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            groups: vec!["user".to_string(), "admin".to_string()],
        };
        let user = Identity {
            id: "u2".to_string(),
            email: "b@example.com".to_string(),
            groups: vec!["user".to_string()],
        };
        assert!(admin.is_admin());
        assert!(!user.is_admin());
    }

    #[tokio::test]
    async fn test_malformed_token_is_rejected() {
        let verifier = JwksVerifier::new("https://issuer.invalid".to_string());
        assert!(verifier.verify("not-a-jwt").await.is_err());
    }
}
