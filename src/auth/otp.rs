// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Identity-provider client for the email one-time-code flow.
//!
//! Two calls: send a code to an email address (returning the provider's
//! method id), then authenticate the code the user typed. The provider owns
//! delivery, rate limiting, and code expiry; this client only carries the
//! requests.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::config::IdpConfig;
use crate::report::FailureReport;

/// Code lifetime requested from the provider.
const CODE_EXPIRATION_MINUTES: u32 = 10;

/// Per-request timeout for provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity provider rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("identity provider response was invalid: {0}")]
    InvalidResponse(String),
}

impl From<&OtpError> for FailureReport {
    fn from(err: &OtpError) -> Self {
        match err {
            OtpError::Transport(inner) => FailureReport::from(inner),
            other => FailureReport::from_message(other.to_string()),
        }
    }
}

/// REST client for the identity provider's OTC endpoints.
pub struct OtpClient {
    base_url: String,
    project_id: String,
    secret: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct SendCodeResponse {
    email_id: String,
}

#[derive(Debug, Deserialize)]
struct AuthenticateResponse {
    user_id: String,
}

#[derive(Debug, Deserialize, Default)]
struct ProviderErrorBody {
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    error_type: Option<String>,
}

impl OtpClient {
    pub fn new(config: &IdpConfig) -> Self {
        Self {
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            secret: config.secret.clone(),
            http: Client::new(),
        }
    }

    /// Send a one-time code to `email`; returns the provider method id
    /// needed to authenticate the code later.
    pub async fn send_code(&self, email: &str) -> Result<String, OtpError> {
        let response = self
            .http
            .post(format!("{}/v1/otps/email/login_or_create", self.base_url))
            .basic_auth(&self.project_id, Some(&self.secret))
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({
                "email": email,
                "expiration_minutes": CODE_EXPIRATION_MINUTES,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status.as_u16(), response).await);
        }

        let body: SendCodeResponse = response
            .json()
            .await
            .map_err(|err| OtpError::InvalidResponse(err.to_string()))?;
        info!("one-time code sent");
        Ok(body.email_id)
    }

    /// Authenticate a code the user received; returns the provider user id.
    pub async fn verify_code(&self, method_id: &str, code: &str) -> Result<String, OtpError> {
        let response = self
            .http
            .post(format!("{}/v1/otps/authenticate", self.base_url))
            .basic_auth(&self.project_id, Some(&self.secret))
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({
                "method_id": method_id,
                "code": code,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status.as_u16(), response).await);
        }

        let body: AuthenticateResponse = response
            .json()
            .await
            .map_err(|err| OtpError::InvalidResponse(err.to_string()))?;
        Ok(body.user_id)
    }
}

async fn rejection(status: u16, response: reqwest::Response) -> OtpError {
    let body = response
        .json::<ProviderErrorBody>()
        .await
        .unwrap_or_default();
    let message = body
        .error_message
        .or(body.error_type)
        .unwrap_or_else(|| "no details provided".to_string());
    OtpError::Rejected { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_messages_render_status_and_detail() {
        let err = OtpError::Rejected {
            status: 401,
            message: "otp_code_not_found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "identity provider rejected the request (HTTP 401): otp_code_not_found"
        );
    }

    #[test]
    fn rejection_goes_through_the_generic_report_path() {
        let err = OtpError::Rejected {
            status: 401,
            message: "otp_code_not_found".to_string(),
        };
        let report = FailureReport::from(&err);
        assert_eq!(report.describe("unused"), err.to_string());
    }

    #[test]
    fn provider_error_body_tolerates_unknown_shapes() {
        let body: ProviderErrorBody = serde_json::from_str(r#"{"unrelated": true}"#).unwrap();
        assert!(body.error_message.is_none());
        assert!(body.error_type.is_none());
    }
}
