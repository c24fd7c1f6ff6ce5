//! Validation coordinator and the HTTP ticket validator.
//!
//! The coordinator turns one [`ValidationRequest`] into exactly one
//! [`ValidationOutcome`]. It never fails past its boundary: transport errors,
//! unknown results and even a panicking validator all come back as outcomes.

use crate::error::TransportError;
use crate::types::{ValidationOutcome, ValidationRequest, ValidationResponse};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{header, Client};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Transport for validation requests
///
/// One call is one attempt. Implementations must not retry.
pub trait TicketValidator: Send + Sync {
    /// Send `request` to the validation service
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no well-formed response was received.
    fn validate(
        &self,
        request: ValidationRequest,
    ) -> BoxFuture<'_, Result<ValidationResponse, TransportError>>;
}

/// Owns validation round-trips and classifies their results
#[derive(Clone)]
pub struct ValidationCoordinator {
    validator: Arc<dyn TicketValidator>,
}

impl ValidationCoordinator {
    /// Create a coordinator over a validator
    #[must_use]
    pub fn new(validator: Arc<dyn TicketValidator>) -> Self {
        Self { validator }
    }

    /// Run one validation attempt
    #[tracing::instrument(skip(self, request), fields(code = %request.code))]
    pub async fn validate(&self, request: ValidationRequest) -> ValidationOutcome {
        let started = Instant::now();
        let validator = Arc::clone(&self.validator);

        let result = AssertUnwindSafe(async move { validator.validate(request).await })
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(Ok(response)) => Self::classify(response),
            Ok(Err(error)) => {
                tracing::warn!(%error, kind = error.kind(), "Validation transport failed");
                metrics::counter!("scanner.validation.transport_errors", "kind" => error.kind())
                    .increment(1);
                ValidationOutcome::TransportError {
                    reason: error.to_string(),
                }
            },
            Err(_) => {
                tracing::error!("Ticket validator panicked");
                metrics::counter!("scanner.validation.transport_errors", "kind" => "panic")
                    .increment(1);
                ValidationOutcome::TransportError {
                    reason: "Network error: validator failed unexpectedly".to_string(),
                }
            },
        };

        metrics::histogram!("scanner.validation.duration_seconds")
            .record(started.elapsed().as_secs_f64());
        metrics::counter!("scanner.validation.outcomes", "outcome" => outcome.label())
            .increment(1);
        tracing::info!(outcome = outcome.label(), "Validation completed");

        outcome
    }

    /// Map a well-formed response onto an outcome
    #[must_use]
    pub fn classify(response: ValidationResponse) -> ValidationOutcome {
        if let Some(chain) = &response.blockchain_status {
            tracing::debug!(
                is_revoked = chain.is_revoked,
                contract_status = chain.contract_status,
                contract_verified = chain.contract_verified,
                last_checked = %chain.last_checked,
                "Blockchain status"
            );
        }
        if let Some(hint) = &response.ui_feedback {
            tracing::debug!(color = %hint.color, sound = %hint.sound, message = %hint.message, "Service feedback hint");
        }

        let detail = |prefix: &str| match response.message.as_deref() {
            Some(message) if !message.is_empty() => format!("{prefix}: {message}"),
            _ => prefix.to_string(),
        };

        match response.validation_result.as_str() {
            "valid" => ValidationOutcome::Valid {
                ticket: response.ticket_info.map(Into::into),
            },
            "invalid" => ValidationOutcome::Invalid {
                reason: detail("Invalid ticket"),
            },
            "revoked" => ValidationOutcome::Revoked {
                reason: detail("Ticket revoked"),
            },
            other => {
                tracing::warn!(result = %other, status = %response.status, "Unknown validation result");
                ValidationOutcome::ProtocolError {
                    reason: format!("Unknown validation result: {other}"),
                }
            },
        }
    }
}

impl std::fmt::Debug for ValidationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationCoordinator").finish_non_exhaustive()
    }
}

/// Validator that POSTs to `{api_base_url}/api/tickets/validate`
#[derive(Clone, Debug)]
pub struct HttpTicketValidator {
    client: Client,
    endpoint: String,
}

impl HttpTicketValidator {
    /// Create a validator with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be built.
    pub fn new(api_base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/tickets/validate", api_base_url.trim_end_matches('/')),
        })
    }

    /// Full URL requests are sent to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TicketValidator for HttpTicketValidator {
    fn validate(
        &self,
        request: ValidationRequest,
    ) -> BoxFuture<'_, Result<ValidationResponse, TransportError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .header(header::ACCEPT, "application/json")
                .json(&request.to_wire())
                .send()
                .await
                .map_err(map_reqwest_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status(status.as_u16()));
            }

            let body = response.bytes().await.map_err(map_reqwest_error)?;
            serde_json::from_slice::<ValidationResponse>(&body)
                .map_err(|e| TransportError::Malformed(e.to_string()))
        })
    }
}

#[allow(clippy::needless_pass_by_value)] // used as a map_err adapter
fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_builder() {
        TransportError::Client(error.to_string())
    } else if error.is_decode() {
        TransportError::Malformed(error.to_string())
    } else {
        TransportError::Network(error.to_string())
    }
}
