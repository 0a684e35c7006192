//! Result records consumed by the calling orchestration layer
//!
//! Mutating commands end with exactly one JSON line on stdout: a success
//! record with a `changed` flag and optional payload, or a failure record
//! carrying the error class name and message. The orchestration layer keys
//! off that line; human-readable output goes to stderr.

use serde::Serialize;

use crate::error::Error;
use crate::prelude::println;

#[derive(Debug, Serialize)]
pub struct TaskOutcome {
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_json: Option<serde_json::Value>,
}

impl TaskOutcome {
    pub fn changed() -> Self {
        Self {
            changed: true,
            msg: None,
            return_json: None,
        }
    }

    pub fn unchanged() -> Self {
        Self {
            changed: false,
            msg: None,
            return_json: None,
        }
    }

    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    pub fn with_return_json(mut self, value: serde_json::Value) -> Self {
        self.return_json = Some(value);
        self
    }
}

#[derive(Debug, Serialize)]
struct TaskFailure {
    failed: bool,
    msg: String,
}

/// Print the success record as the command's final stdout line.
pub fn emit_outcome(outcome: &TaskOutcome) -> crate::prelude::Result<()> {
    println!("{}", serde_json::to_string(outcome)?);
    Ok(())
}

/// Convert a boundary error into the structured failure record.
pub fn emit_failure(error: &Error) {
    let failure = TaskFailure {
        failed: true,
        msg: error.to_string(),
    };
    match serde_json::to_string(&failure) {
        Ok(json) => println!("{json}"),
        Err(_) => println!("{{\"failed\": true}}"),
    }
}
