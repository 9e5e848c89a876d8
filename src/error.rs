use thiserror::Error;

use crate::api::ApiError;
use crate::prompt::PromptError;

/// Failures of the order configuration and submission workflow.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Allocation request outside `1..=remaining`. Re-prompted, never
    /// surfaced from the interactive flow.
    #[error("{requested} kg is out of range, choose between 1 and {remaining} kg")]
    OutOfRange { requested: u32, remaining: u32 },

    #[error("order configuration cancelled")]
    Cancelled,

    #[error("tier price {0:?} is not a valid number")]
    InvalidPrice(String),

    #[error("order submission failed: {0}")]
    Network(#[from] ApiError),

    #[error("terminal input failed: {0}")]
    Prompt(#[from] std::io::Error),
}

impl From<PromptError> for OrderError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::Cancelled => OrderError::Cancelled,
            PromptError::Io(e) => OrderError::Prompt(e),
        }
    }
}
