//! Domain types for the scanner: statuses, candidates, requests, outcomes and
//! the validation service wire model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Scan status
// ============================================================================

/// User-facing state of the scanner
///
/// Exactly one status is active. The scanner starts in `Ready` and only the
/// reducer changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScanStatus {
    /// Waiting for a code
    #[default]
    Ready,
    /// A code was accepted and is being validated
    Scanning,
    /// The ticket is valid; allow entry
    Valid,
    /// The ticket is not valid
    Invalid,
    /// The ticket has been revoked
    Revoked,
    /// Validation could not be completed
    Error,
}

impl ScanStatus {
    /// Headline shown for the status
    #[must_use]
    pub const fn headline(self) -> &'static str {
        match self {
            Self::Ready => "Ready to scan",
            Self::Scanning => "Validating...",
            Self::Valid => "VALID TICKET",
            Self::Invalid => "INVALID TICKET",
            Self::Revoked => "REVOKED TICKET",
            Self::Error => "ERROR",
        }
    }

    /// Detail line shown when no more specific reason is available
    #[must_use]
    pub const fn default_detail(self) -> &'static str {
        match self {
            Self::Ready => "Point camera at QR code",
            Self::Scanning => "Please wait",
            Self::Valid => "Allow entry",
            Self::Invalid | Self::Revoked => "Deny entry",
            Self::Error => "Try again",
        }
    }

    /// Instruction line for the operator
    #[must_use]
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::Ready => "Position QR code within the frame",
            Self::Scanning => "Checking ticket validity",
            Self::Valid => "Entry approved",
            Self::Invalid => "Ticket not valid",
            Self::Revoked => "Ticket has been revoked",
            Self::Error => "Validation failed",
        }
    }

    /// Whether the manual reset control is offered
    #[must_use]
    pub const fn offers_reset(self) -> bool {
        !matches!(self, Self::Ready | Self::Scanning)
    }

    /// Stable lowercase name, used in logs and metric labels
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Scanning => "scanning",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Revoked => "revoked",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Candidate and request
// ============================================================================

/// A decoded code accepted by the detection gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Raw decoded payload
    pub code: String,
    /// When the frame carrying the code was decoded
    pub observed_at: DateTime<Utc>,
}

/// Who is scanning, and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerIdentity {
    /// Scanner (admin) id
    pub scanner_id: String,
    /// Physical location of the gate
    pub location: String,
    /// Device id
    pub device_id: String,
}

/// One validation request, built per accepted candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    /// Ticket code to validate
    pub code: String,
    /// Scanner (admin) id
    pub scanner_id: String,
    /// Physical location of the gate
    pub location: String,
    /// Device id
    pub device_id: String,
}

impl ValidationRequest {
    /// Build a request for `code` from the scanner's identity
    #[must_use]
    pub fn new(code: impl Into<String>, identity: &ScannerIdentity) -> Self {
        Self {
            code: code.into(),
            scanner_id: identity.scanner_id.clone(),
            location: identity.location.clone(),
            device_id: identity.device_id.clone(),
        }
    }

    /// Wire body for the validation endpoint
    #[must_use]
    pub fn to_wire(&self) -> ValidateTicketBody<'_> {
        ValidateTicketBody {
            qr_data: &self.code,
            scanner_info: ScannerInfo {
                admin_id: &self.scanner_id,
                location: &self.location,
                device_id: &self.device_id,
            },
        }
    }
}

// ============================================================================
// Wire model
// ============================================================================

/// JSON body POSTed to the validation endpoint
#[derive(Debug, Serialize)]
pub struct ValidateTicketBody<'a> {
    /// The scanned code
    pub qr_data: &'a str,
    /// The scanner's identity
    pub scanner_info: ScannerInfo<'a>,
}

/// Scanner identity as sent on the wire
#[derive(Debug, Serialize)]
pub struct ScannerInfo<'a> {
    /// Scanner (admin) id
    pub admin_id: &'a str,
    /// Gate location
    pub location: &'a str,
    /// Device id
    pub device_id: &'a str,
}

/// Response from the validation endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidationResponse {
    /// Request status reported by the service
    pub status: String,
    /// `"valid"`, `"invalid"` or `"revoked"`
    pub validation_result: String,
    /// Human-readable explanation
    #[serde(default)]
    pub message: Option<String>,
    /// Ticket details, present for valid tickets
    #[serde(default)]
    pub ticket_info: Option<TicketInfo>,
    /// On-chain status of the ticket contract
    #[serde(default)]
    pub blockchain_status: Option<BlockchainStatus>,
    /// Service-suggested feedback
    #[serde(default)]
    pub ui_feedback: Option<UiFeedback>,
}

/// Ticket details from the service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TicketInfo {
    /// Ticket number
    pub ticket_number: i64,
    /// Event name
    pub event_name: String,
    /// Ticket holder
    pub holder_name: String,
    /// Entry type (e.g. "VIP", "General")
    pub entry_type: String,
}

/// On-chain status block
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockchainStatus {
    /// Whether the ticket was revoked on-chain
    pub is_revoked: bool,
    /// Raw contract status code
    pub contract_status: i64,
    /// When the service last checked the chain
    pub last_checked: String,
    /// Whether the contract was verified
    pub contract_verified: bool,
}

/// Feedback hints from the service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UiFeedback {
    /// Suggested color
    pub color: String,
    /// Suggested message
    pub message: String,
    /// Suggested sound
    pub sound: String,
}

// ============================================================================
// Outcome
// ============================================================================

/// Display-only summary of a valid ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSummary {
    /// Ticket number
    pub number: i64,
    /// Event name
    pub event_name: String,
    /// Ticket holder
    pub holder_name: String,
    /// Entry type
    pub entry_type: String,
}

impl From<TicketInfo> for TicketSummary {
    fn from(info: TicketInfo) -> Self {
        Self {
            number: info.ticket_number,
            event_name: info.event_name,
            holder_name: info.holder_name,
            entry_type: info.entry_type,
        }
    }
}

impl fmt::Display for TicketSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ticket #{} | Event: {} | Holder: {} | Entry: {}",
            self.number, self.event_name, self.holder_name, self.entry_type
        )
    }
}

/// Classified result of one validation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The ticket may enter
    Valid {
        /// Ticket details, when the service sent them
        ticket: Option<TicketSummary>,
    },
    /// The ticket is not valid
    Invalid {
        /// Operator-facing reason
        reason: String,
    },
    /// The ticket was revoked
    Revoked {
        /// Operator-facing reason
        reason: String,
    },
    /// The service could not be reached or answered badly
    TransportError {
        /// Operator-facing reason
        reason: String,
    },
    /// The service answered with something we don't understand
    ProtocolError {
        /// Operator-facing reason
        reason: String,
    },
}

impl ValidationOutcome {
    /// The status the scanner shows for this outcome
    #[must_use]
    pub const fn status(&self) -> ScanStatus {
        match self {
            Self::Valid { .. } => ScanStatus::Valid,
            Self::Invalid { .. } => ScanStatus::Invalid,
            Self::Revoked { .. } => ScanStatus::Revoked,
            Self::TransportError { .. } | Self::ProtocolError { .. } => ScanStatus::Error,
        }
    }

    /// Operator-facing reason, if any
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid { reason }
            | Self::Revoked { reason }
            | Self::TransportError { reason }
            | Self::ProtocolError { reason } => Some(reason),
        }
    }

    /// Whether the attempt failed to produce a verdict
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::TransportError { .. } | Self::ProtocolError { .. })
    }

    /// Metric label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Valid { .. } => "valid",
            Self::Invalid { .. } => "invalid",
            Self::Revoked { .. } => "revoked",
            Self::TransportError { .. } => "transport_error",
            Self::ProtocolError { .. } => "protocol_error",
        }
    }
}
