use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::types::AnyError;

/// Exception severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    /// The cause is known and expected, nothing is wrong with the system.
    Common,
    /// The remote side returned something unexpected, such as a page that no
    /// longer has the data it used to have.
    Suspicious,
    /// The cause is unknown or comes from our side.
    Fault,
}

/// A failure whose message can be shown to the end user as is.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FriendlyError {
    pub message: String,
    pub severity: Severity,
    #[source]
    pub cause: Option<AnyError>,
}

impl FriendlyError {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            cause: None,
        }
    }

    pub fn with_cause(
        message: impl Into<String>,
        severity: Severity,
        cause: impl Into<AnyError>,
    ) -> Self {
        Self {
            message: message.into(),
            severity,
            cause: Some(cause.into()),
        }
    }

    /// Short description of the underlying cause, or the message itself when
    /// there is none.
    pub fn cause_description(&self) -> String {
        match &self.cause {
            Some(cause) => cause.to_string(),
            None => self.message.clone(),
        }
    }
}
