//! Scripted ticket validator.

use crate::error::TransportError;
use crate::types::{TicketInfo, ValidationRequest, ValidationResponse};
use crate::validation::TicketValidator;
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

type Reply = Result<ValidationResponse, TransportError>;

#[derive(Default)]
struct Script {
    replies: VecDeque<(Option<Duration>, Reply)>,
    requests: Vec<ValidationRequest>,
}

/// Validator that answers from a queue of scripted replies
///
/// With an empty queue every call fails with a network error.
#[derive(Clone, Default)]
pub struct MockValidator {
    script: Arc<Mutex<Script>>,
}

impl MockValidator {
    /// Validator with no scripted replies
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    #[must_use]
    pub fn respond(self, response: ValidationResponse) -> Self {
        self.push(None, Ok(response));
        self
    }

    /// Queue a transport failure
    #[must_use]
    pub fn fail(self, error: TransportError) -> Self {
        self.push(None, Err(error));
        self
    }

    /// Queue a reply delivered after `latency` (tokio time)
    #[must_use]
    pub fn respond_after(self, latency: Duration, reply: Reply) -> Self {
        self.push(Some(latency), reply);
        self
    }

    /// Queue another reply on a shared handle
    pub fn push(&self, latency: Option<Duration>, reply: Reply) {
        self.lock().replies.push_back((latency, reply));
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<ValidationRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TicketValidator for MockValidator {
    fn validate(&self, request: ValidationRequest) -> BoxFuture<'_, Reply> {
        let next = {
            let mut script = self.lock();
            script.requests.push(request);
            script.replies.pop_front()
        };

        Box::pin(async move {
            match next {
                Some((Some(latency), reply)) => {
                    tokio::time::sleep(latency).await;
                    reply
                },
                Some((None, reply)) => reply,
                None => Err(TransportError::Network("no scripted reply".to_string())),
            }
        })
    }
}

impl std::fmt::Debug for MockValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockValidator")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

/// A response with `validation_result` and an optional message
#[must_use]
pub fn response(validation_result: &str, message: Option<&str>) -> ValidationResponse {
    ValidationResponse {
        status: "success".to_string(),
        validation_result: validation_result.to_string(),
        message: message.map(str::to_string),
        ticket_info: None,
        blockchain_status: None,
        ui_feedback: None,
    }
}

/// A `valid` response carrying ticket details
#[must_use]
pub fn valid_response(ticket_number: i64, event_name: &str, holder_name: &str) -> ValidationResponse {
    ValidationResponse {
        ticket_info: Some(TicketInfo {
            ticket_number,
            event_name: event_name.to_string(),
            holder_name: holder_name.to_string(),
            entry_type: "General".to_string(),
        }),
        ..response("valid", Some("Ticket is valid"))
    }
}
