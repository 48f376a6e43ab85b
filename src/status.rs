use std::{fmt, process};

use crate::error::CheckError;

/// Monitoring state of a check, ordered from best to worst.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServiceState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    pub fn exit_code(self) -> i32 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
            ServiceState::Unknown => 3,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceState::Ok => "OK",
            ServiceState::Warning => "WARNING",
            ServiceState::Critical => "CRITICAL",
            ServiceState::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// Final result of a check run: a state and the line printed for it.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub state: ServiceState,
    pub message: String,
}

impl CheckOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        CheckOutcome {
            state: ServiceState::Ok,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.state.exit_code()
    }

    /// Prints the outcome line and terminates the process with its code.
    pub fn exit(self) -> ! {
        println!("{}", self);
        process::exit(self.exit_code())
    }
}

impl From<CheckError> for CheckOutcome {
    fn from(err: CheckError) -> Self {
        CheckOutcome {
            state: err.service_state(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SFTP {}: {}", self.state, self.message)
    }
}
