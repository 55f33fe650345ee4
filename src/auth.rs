//! Service account authentication for Google APIs.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DriveError, Result};
use crate::models::{ServiceAccountCredentials, TokenResponse};

/// Environment variable holding the service account JSON blob.
pub const CREDENTIALS_ENV: &str = "GOOGLE_DRIVE_CREDENTIALS";

/// Google OAuth2 token endpoint.
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Google Drive API scope.
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// JWT claims for service account authentication.
#[derive(Debug, Serialize)]
struct Claims {
    iss: String,   // Issuer (service account email)
    scope: String, // OAuth scope
    aud: String,   // Audience (token endpoint)
    exp: u64,      // Expiration time
    iat: u64,      // Issued at
}

/// Cached access token with expiration.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: SystemTime,
}

/// Authenticator for Google APIs.
///
/// Tokens are minted from service account credentials and cached until
/// shortly before they expire. An authenticator built from a bare access
/// token never refreshes.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Option<Arc<ServiceAccountCredentials>>,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl Authenticator {
    /// Create a new authenticator from the `GOOGLE_DRIVE_CREDENTIALS` environment variable.
    ///
    /// An unset or empty variable is reported as missing.
    pub fn from_env() -> Result<Self> {
        let content = std::env::var(CREDENTIALS_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| DriveError::MissingCredentials(CREDENTIALS_ENV.to_string()))?;
        Self::from_json(&content)
    }

    /// Create a new authenticator from a service account JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        let credentials: ServiceAccountCredentials = serde_json::from_str(content)?;
        Ok(Self::new(credentials))
    }

    /// Create a new authenticator from a service account JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Create a new authenticator from credentials.
    pub fn new(credentials: ServiceAccountCredentials) -> Self {
        Self {
            credentials: Some(Arc::new(credentials)),
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Create an authenticator that always presents the given access token.
    pub fn from_access_token(token: impl Into<String>) -> Self {
        let token = CachedToken {
            access_token: token.into(),
            expires_at: SystemTime::UNIX_EPOCH,
        };
        Self {
            credentials: None,
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(Some(token))),
        }
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String> {
        let Some(credentials) = self.credentials.as_ref() else {
            let cached = self.cached_token.read().await;
            return cached
                .as_ref()
                .map(|token| token.access_token.clone())
                .ok_or_else(|| DriveError::TokenRefresh("no access token available".to_string()));
        };

        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                // Add 60 second buffer before expiration
                let buffer = Duration::from_secs(60);
                if token.expires_at > SystemTime::now() + buffer {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let new_token = self.refresh_token(credentials).await?;

        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(new_token.clone());
        }

        Ok(new_token.access_token)
    }

    /// Refresh the access token using JWT assertion.
    async fn refresh_token(&self, credentials: &ServiceAccountCredentials) -> Result<CachedToken> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| DriveError::TokenRefresh(e.to_string()))?
            .as_secs();

        let token_uri = credentials.token_uri.as_deref().unwrap_or(TOKEN_URI);
        let claims = Claims {
            iss: credentials.client_email.clone(),
            scope: DRIVE_SCOPE.to_string(),
            aud: token_uri.to_string(),
            iat: now,
            exp: now + 3600, // 1 hour
        };

        let header = Header::new(Algorithm::RS256);
        let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())?;
        let jwt = encode(&header, &claims, &key)?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", &jwt),
        ];

        debug!(client_email = %credentials.client_email, "requesting access token");
        let response = self.client.post(token_uri).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::TokenRefresh(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;

        let expires_at = SystemTime::now() + Duration::from_secs(token_response.expires_in);

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialization() {
        let claims = Claims {
            iss: "test@example.iam.gserviceaccount.com".to_string(),
            scope: DRIVE_SCOPE.to_string(),
            aud: TOKEN_URI.to_string(),
            iat: 1234567890,
            exp: 1234571490,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("test@example.iam.gserviceaccount.com"));
        assert!(json.contains(DRIVE_SCOPE));
    }

    #[tokio::test]
    async fn test_static_token_is_returned() {
        let auth = Authenticator::from_access_token("ya29.static");
        assert_eq!(auth.get_access_token().await.unwrap(), "ya29.static");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = Authenticator::from_json("not json").err().unwrap();
        assert!(matches!(err, DriveError::CredentialsParse(_)));
    }
}
