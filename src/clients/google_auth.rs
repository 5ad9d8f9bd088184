//! Autenticación OAuth2 de cuenta de servicio para Google Drive
//!
//! Firma una aserción JWT (RS256), la intercambia por un access token y lo
//! mantiene en cache hasta poco antes de su expiración. Toda la aplicación
//! comparte una sola sesión.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::drive::{ServiceAccountKey, DRIVE_SCOPE};
use crate::utils::errors::{external_api_error, AppError, AppResult};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Margen antes de la expiración en el que el token ya se considera vencido
const REFRESH_MARGIN_SECS: i64 = 60;

/// Token de acceso en cache
#[derive(Clone, Debug)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: String, expires_in_secs: i64) -> Self {
        Self {
            token,
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(REFRESH_MARGIN_SECS) >= self.expires_at
    }
}

/// Claims de la aserción enviada al token_uri
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Sesión autenticada de la cuenta de servicio
#[derive(Clone)]
pub struct ServiceAccountAuth {
    http: Client,
    key: ServiceAccountKey,
    token: Arc<RwLock<Option<AccessToken>>>,
}

impl ServiceAccountAuth {
    pub fn new(http: Client, key: ServiceAccountKey) -> Self {
        Self {
            http,
            key,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Obtener un token válido, renovándolo si hace falta
    pub async fn access_token(&self) -> AppResult<String> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
                return Ok(token.token.clone());
            }
        }

        let mut cached = self.token.write().await;
        // Otro request pudo haberlo renovado mientras esperábamos el lock
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.token.clone());
        }

        debug!("🔑 Renovando access token de Google Drive");
        let fresh = self.fetch_token().await?;
        let value = fresh.token.clone();
        *cached = Some(fresh);
        info!("✅ Access token de Google Drive renovado");
        Ok(value)
    }

    async fn fetch_token(&self) -> AppResult<AccessToken> {
        let assertion = build_assertion(&self.key, Utc::now())?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| external_api_error("token request", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(external_api_error(
                "token request",
                format!("HTTP {}: {}", status, body),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| external_api_error("token response", e))?;

        Ok(AccessToken::new(token.access_token, token.expires_in))
    }
}

/// Firmar la aserción JWT de la cuenta de servicio
fn build_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> AppResult<String> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: DRIVE_SCOPE,
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
        AppError::Configuration(format!("invalid service account private key: {}", e))
    })?;

    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("could not sign service account assertion: {}", e)))
}
