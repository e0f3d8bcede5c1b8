/// Pre-submission gates that block a buy/sell application outright.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityError {
    #[error("submission attempted at or after the applicable cut-off time")]
    PastCutoff,
    #[error("fund risk exceeds the client's profile and no waiver is attached")]
    WaiverRequired,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("no approval item with id {0}")]
    NotFound(String),
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),
}
