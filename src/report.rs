// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Failure reporting: one human-readable string for any caught failure.
//!
//! Blockchain calls can fail at three different levels and each level throws
//! a different shape: the HTTP client itself (connect/timeout/TLS), Horizon's
//! structured problem document (title/detail/extras), or a plain error with a
//! message. Handlers should not care which one they got; they build a
//! [`FailureReport`] at the catch site and render it with
//! [`FailureReport::describe`], which always returns a string and never
//! panics.
//!
//! The report is a closed set of recognized shapes rather than dynamic
//! property probing: adapters (`From` impls on the client error types) fill
//! in whichever shapes apply, and a failure may carry more than one (an HTTP
//! 400 that also parsed as a Horizon problem renders both fragments).

use serde_json::Value;

/// Separator between the pieces of a single fragment.
const PIECE_SEPARATOR: &str = " – ";

/// Separator between the transport and Horizon fragments when both apply.
const FRAGMENT_SEPARATOR: &str = " | ";

/// Rendered when the transport shape is present but carries no detail at all.
const EMPTY_TRANSPORT_MESSAGE: &str = "Network request failed";

/// An HTTP-client-level failure (connection, timeout, or a raw error
/// response that never parsed into anything more structured).
#[derive(Debug, Clone, Default)]
pub struct TransportFailure {
    /// HTTP status code, if a response was received.
    pub status: Option<u16>,
    /// Canonical status text (e.g. "Not Found").
    pub status_text: Option<String>,
    /// Client-level error message.
    pub message: Option<String>,
    /// Response body, if one was captured.
    pub body: Option<Value>,
}

/// A structured Horizon API failure (problem document).
#[derive(Debug, Clone)]
pub struct HorizonFailure {
    /// HTTP status of the Horizon response.
    pub status: u16,
    /// Problem title (e.g. "Transaction Failed").
    pub title: Option<String>,
    /// Problem detail text.
    pub detail: Option<String>,
    /// The `extras` mapping (result codes and related diagnostics).
    pub extras: Option<Value>,
}

/// Everything diagnostic that was recognized in one caught failure.
///
/// Built at the boundary where a client error is caught, then rendered once
/// for the UI. A report with no recognized shape and no message renders as
/// the caller-supplied fallback.
#[derive(Debug, Clone, Default)]
pub struct FailureReport {
    transport: Option<TransportFailure>,
    horizon: Option<HorizonFailure>,
    message: Option<String>,
}

impl FailureReport {
    /// A report carrying only a plain message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// A report carrying an HTTP-client-level failure.
    pub fn from_transport(transport: TransportFailure) -> Self {
        Self {
            transport: Some(transport),
            ..Self::default()
        }
    }

    /// A report carrying a structured Horizon failure.
    pub fn from_horizon(horizon: HorizonFailure) -> Self {
        Self {
            horizon: Some(horizon),
            ..Self::default()
        }
    }

    /// Attach a Horizon shape to an existing report.
    pub fn with_horizon(mut self, horizon: HorizonFailure) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Render the report as one display string.
    ///
    /// Fragment order is fixed: transport first, Horizon second, joined with
    /// `" | "` when both are present. With neither shape, a non-empty message
    /// wins; otherwise the fallback is returned verbatim. This method never
    /// panics: a body or extras value that cannot be stringified drops that
    /// piece (with a debug-level diagnostic) instead of failing.
    pub fn describe(&self, fallback: &str) -> String {
        let transport = self.transport.as_ref().map(transport_fragment);
        let horizon = self.horizon.as_ref().map(horizon_fragment);

        match (transport, horizon) {
            (Some(a), Some(b)) => format!("{a}{FRAGMENT_SEPARATOR}{b}"),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => match &self.message {
                Some(message) if !message.is_empty() => message.clone(),
                _ => fallback.to_string(),
            },
        }
    }
}

impl From<&reqwest::Error> for FailureReport {
    fn from(err: &reqwest::Error) -> Self {
        let status = err.status();
        Self::from_transport(TransportFailure {
            status: status.map(|s| s.as_u16()),
            status_text: status
                .and_then(|s| s.canonical_reason())
                .map(str::to_string),
            message: Some(err.to_string()),
            body: None,
        })
    }
}

fn transport_fragment(failure: &TransportFailure) -> String {
    let mut pieces = Vec::new();

    if let Some(status) = failure.status {
        pieces.push(format!("HTTP {status}"));
    }
    if let Some(text) = non_empty(&failure.status_text) {
        pieces.push(text.to_string());
    }
    if let Some(message) = non_empty(&failure.message) {
        pieces.push(message.to_string());
    }
    if let Some(body) = &failure.body {
        if let Some(json) = stringify("response body", body) {
            pieces.push(format!("Response: {json}"));
        }
    }

    if pieces.is_empty() {
        EMPTY_TRANSPORT_MESSAGE.to_string()
    } else {
        pieces.join(PIECE_SEPARATOR)
    }
}

fn horizon_fragment(failure: &HorizonFailure) -> String {
    let mut pieces = vec![format!("Horizon HTTP {}", failure.status)];

    if let Some(title) = non_empty(&failure.title) {
        pieces.push(title.to_string());
    }
    if let Some(detail) = non_empty(&failure.detail) {
        pieces.push(detail.to_string());
    }
    if let Some(extras) = &failure.extras {
        if let Some(json) = stringify("extras", extras) {
            pieces.push(format!("Extras: {json}"));
        }
    }

    pieces.join(PIECE_SEPARATOR)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Stringify a JSON value for display. A value that cannot be serialized is
/// dropped from the report rather than propagated; the loss is visible at
/// debug level so it is not silent in development.
fn stringify(label: &str, value: &Value) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(err) => {
            tracing::debug!("dropping {label} from failure report: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unrecognized_failure_returns_fallback() {
        let report = FailureReport::default();
        assert_eq!(report.describe("fallback text"), "fallback text");
    }

    #[test]
    fn transport_fragment_includes_all_pieces() {
        let report = FailureReport::from_transport(TransportFailure {
            status: Some(404),
            status_text: Some("Not Found".into()),
            message: Some("Request failed".into()),
            body: Some(json!({"x": 1})),
        });
        assert_eq!(
            report.describe("unused"),
            "HTTP 404 – Not Found – Request failed – Response: {\"x\":1}"
        );
    }

    #[test]
    fn horizon_fragment_includes_title_and_detail() {
        let report = FailureReport::from_horizon(HorizonFailure {
            status: 400,
            title: Some("Bad Request".into()),
            detail: Some("op_underfunded".into()),
            extras: None,
        });
        assert_eq!(
            report.describe("unused"),
            "Horizon HTTP 400 – Bad Request – op_underfunded"
        );
    }

    #[test]
    fn horizon_fragment_renders_extras() {
        let report = FailureReport::from_horizon(HorizonFailure {
            status: 400,
            title: Some("Transaction Failed".into()),
            detail: None,
            extras: Some(json!({"result_codes": {"transaction": "tx_failed"}})),
        });
        assert_eq!(
            report.describe("unused"),
            "Horizon HTTP 400 – Transaction Failed – \
             Extras: {\"result_codes\":{\"transaction\":\"tx_failed\"}}"
        );
    }

    #[test]
    fn both_shapes_join_transport_first() {
        let report = FailureReport::from_transport(TransportFailure {
            status: Some(400),
            status_text: Some("Bad Request".into()),
            message: None,
            body: None,
        })
        .with_horizon(HorizonFailure {
            status: 400,
            title: Some("Transaction Failed".into()),
            detail: None,
            extras: None,
        });
        assert_eq!(
            report.describe("unused"),
            "HTTP 400 – Bad Request | Horizon HTTP 400 – Transaction Failed"
        );
    }

    #[test]
    fn empty_transport_shape_uses_fixed_message() {
        let report = FailureReport::from_transport(TransportFailure::default());
        assert_eq!(report.describe("unused"), "Network request failed");
    }

    #[test]
    fn plain_message_passes_through() {
        let report = FailureReport::from_message("boom");
        assert_eq!(report.describe("fallback"), "boom");
    }

    #[test]
    fn empty_message_falls_back() {
        let report = FailureReport::from_message("");
        assert_eq!(report.describe("fallback"), "fallback");
    }

    #[test]
    fn empty_strings_are_skipped_within_fragments() {
        let report = FailureReport::from_transport(TransportFailure {
            status: Some(500),
            status_text: Some(String::new()),
            message: Some(String::new()),
            body: None,
        });
        assert_eq!(report.describe("unused"), "HTTP 500");
    }

    #[test]
    fn describe_never_panics_on_awkward_values() {
        let awkward = [
            json!(null),
            json!([1, 2, [3, [4, [5]]]]),
            json!({"nested": {"deeply": {"": ""}}}),
            json!(f64::MAX),
        ];
        for value in awkward {
            let report = FailureReport::from_transport(TransportFailure {
                status: None,
                status_text: None,
                message: None,
                body: Some(value.clone()),
            })
            .with_horizon(HorizonFailure {
                status: 400,
                title: None,
                detail: None,
                extras: Some(value),
            });
            // Only the output's existence matters here.
            assert!(!report.describe("fallback").is_empty());
        }
    }
}
