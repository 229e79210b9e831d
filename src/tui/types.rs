use crate::error::{TransportError, TRANSPORT_ERROR_MESSAGE};
use crate::protocol::CommandResponse;

/// Which control of the form receives keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusedControl {
    Input,
    Submit,
}

impl FocusedControl {
    pub fn next(self) -> Self {
        match self {
            FocusedControl::Input => FocusedControl::Submit,
            FocusedControl::Submit => FocusedControl::Input,
        }
    }
}

/// What the outcome panel shows. Replaced wholesale, never edited in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Nothing completed yet, or a submission is in flight.
    #[default]
    None,
    Result {
        status: Option<String>,
        message: Option<String>,
    },
    TransportError {
        message: String,
    },
}

impl SubmissionOutcome {
    pub fn transport_error() -> Self {
        SubmissionOutcome::TransportError {
            message: TRANSPORT_ERROR_MESSAGE.to_string(),
        }
    }

    /// Maps an executor reply. A blank reply shows no panel; every transport
    /// failure collapses to the fixed message.
    pub fn from_reply(reply: Result<Option<CommandResponse>, TransportError>) -> Self {
        match reply {
            Ok(Some(response)) => SubmissionOutcome::from(response),
            Ok(None) => SubmissionOutcome::None,
            Err(e) => {
                tracing::debug!(error = %e, "submission failed");
                SubmissionOutcome::transport_error()
            }
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SubmissionOutcome::None)
    }

    /// Panel category; transport errors have none.
    pub fn category(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Result { status, .. } => status.as_deref(),
            _ => None,
        }
    }

    /// Panel body; blank when the endpoint sent no message.
    pub fn message(&self) -> &str {
        match self {
            SubmissionOutcome::None => "",
            SubmissionOutcome::Result { message, .. } => message.as_deref().unwrap_or(""),
            SubmissionOutcome::TransportError { message } => message,
        }
    }
}

impl From<CommandResponse> for SubmissionOutcome {
    fn from(response: CommandResponse) -> Self {
        SubmissionOutcome::Result {
            status: response.status,
            message: response.message,
        }
    }
}

#[derive(Clone, Debug)]
pub enum AppMessage {
    /// A submission finished; `seq` is the sequence number it was issued with.
    SubmissionComplete { seq: u64, outcome: SubmissionOutcome },
}
