use anyhow::{Context, Result};
use reqwest::{Client, Url};

use super::dto::{OtpRequest, RefreshRequest, VerifyOtpRequest};
use super::rest::{parse_base_url, read_json, send};
use super::ServiceError;
use crate::types::Session;

/// Email one-time-code flow against the identity provider.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    base_url: Url,
    anon_key: String,
}

impl AuthClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            anon_key: anon_key.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Failed to build URL for path {}", path))
    }

    /// Ask the provider to email a one-time code (and a magic link) to `email`.
    pub async fn send_otp(&self, email: &str) -> Result<()> {
        let request = self
            .client
            .post(self.endpoint("/auth/v1/otp")?)
            .header("apikey", &self.anon_key)
            .json(&OtpRequest {
                email,
                create_user: true,
            });
        send(request, "POST /auth/v1/otp")
            .await
            .context("Failed to request a login code")?;
        Ok(())
    }

    /// Exchange the emailed code for a session.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<Session> {
        let request = self
            .client
            .post(self.endpoint("/auth/v1/verify")?)
            .header("apikey", &self.anon_key)
            .json(&VerifyOtpRequest {
                kind: "email",
                email,
                token: code,
            });
        let response = send(request, "POST /auth/v1/verify")
            .await
            .context("Login code was not accepted")?;
        let session = read_json(response, "POST /auth/v1/verify").await?;
        Ok(session)
    }

    /// Trade the session's refresh token for a fresh session.
    ///
    /// Errors stay typed so callers can tell a revoked token (`Unauthorized`,
    /// `Rejected`) from the provider being unreachable.
    pub async fn refresh(&self, session: &Session) -> Result<Session, ServiceError> {
        const OPERATION: &str = "POST /auth/v1/token";
        let Some(refresh_token) = session.refresh_token.as_deref() else {
            return Err(ServiceError::Unauthorized);
        };
        let url = self
            .base_url
            .join("/auth/v1/token")
            .map_err(|e| ServiceError::transport(OPERATION, e))?;
        let request = self
            .client
            .post(url)
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&RefreshRequest { refresh_token });
        let response = send(request, OPERATION).await?;
        read_json(response, OPERATION).await
    }

    /// Revoke the session's refresh token on the provider side.
    pub async fn logout(&self, session: &Session) -> Result<()> {
        let request = self
            .client
            .post(self.endpoint("/auth/v1/logout")?)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token);
        send(request, "POST /auth/v1/logout").await?;
        Ok(())
    }
}
