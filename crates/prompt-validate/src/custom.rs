//! Shells out to an external command to validate (and optionally complete) a
//! captured value.

use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

use crate::base::ValidatorResult;

#[derive(Debug, Error)]
pub enum CustomValidatorError {
    #[error("failed to spawn validator command: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("validator command timed out after {0:?}")]
    Timeout(Duration),
}

/// Runs `command value cwd` as a child process; exit code 0 means valid,
/// stdout (if non-empty) becomes newline-separated completions.
#[derive(Debug, Clone)]
pub struct CustomValidator {
    pub command: String,
    pub timeout: Duration,
}

impl CustomValidator {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    pub async fn validate(&self, value: &str, cwd: &str) -> Result<ValidatorResult, CustomValidatorError> {
        let mut cmd = Command::new(&self.command);
        cmd.arg(value)
            .arg(cwd)
            .env("VALUE", value)
            .env("CWD", cwd)
            .kill_on_drop(true);

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| CustomValidatorError::Timeout(self.timeout))?
            .map_err(CustomValidatorError::Spawn)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let completions: Vec<String> = stdout.lines().map(str::to_string).filter(|l| !l.is_empty()).collect();

        if output.status.success() {
            Ok(ValidatorResult {
                completions,
                valid: true,
                message: None,
                selected_index: None,
            })
        } else {
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Ok(ValidatorResult {
                completions,
                valid: false,
                message: if message.is_empty() { None } else { Some(message) },
                selected_index: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_command_is_valid() {
        let validator = CustomValidator::new("true", Duration::from_secs(1));
        let result = validator.validate("x", "/tmp").await.unwrap();
        assert!(result.valid);
    }

    #[tokio::test]
    async fn failing_command_is_invalid() {
        let validator = CustomValidator::new("false", Duration::from_secs(1));
        let result = validator.validate("x", "/tmp").await.unwrap();
        assert!(!result.valid);
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let validator = CustomValidator::new("sleep", Duration::from_millis(10));
        // GNU sleep sums multiple NUMBER arguments; "0" keeps cwd numeric so
        // the process actually sleeps instead of erroring on a bad argument.
        let err = validator.validate("10", "0").await;
        assert!(matches!(err, Err(CustomValidatorError::Timeout(_))));
    }
}
