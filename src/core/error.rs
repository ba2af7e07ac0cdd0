use thiserror::Error;

/// Message shown to the user whenever a generation attempt fails, whatever
/// the underlying cause.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate story. Please check your API key and try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("cannot {operation}: {reason}")]
    PreconditionFailed {
        operation: &'static str,
        reason: String,
    },
    #[error("a story is already being generated")]
    Busy,
}

impl From<PromptError> for WorkflowError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::InvalidInput(msg) => WorkflowError::InvalidInput(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_error_maps_to_invalid_input() {
        let err: WorkflowError = PromptError::InvalidInput("no theme selected".to_string()).into();
        assert_eq!(err, WorkflowError::InvalidInput("no theme selected".to_string()));
    }

    #[test]
    fn test_precondition_display() {
        let err = WorkflowError::PreconditionFailed {
            operation: "retry",
            reason: "workflow is selecting".to_string(),
        };
        assert_eq!(err.to_string(), "cannot retry: workflow is selecting");
    }
}
