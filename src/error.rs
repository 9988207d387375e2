use thiserror::Error;

/// Errors raised by the selection and progression core
///
/// Caller mistakes (empty pools, missing run signals) surface here. The
/// mastery ledger never returns these; it repairs and logs instead.
#[derive(Error, Debug)]
pub enum AlgoError {
    #[error("letter pool is empty")]
    EmptyPool,

    #[error("invalid letter: {0:?}")]
    InvalidLetter(String),

    #[error("run result must include success, mistakes or errors")]
    MissingRunSignal,

    #[error("invalid run result: {0}")]
    InvalidRunResult(String),

    #[error("unknown value: {0:?}")]
    UnknownVariant(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("run already finished")]
    RunFinished,

    #[error("no prompt is active")]
    NoActivePrompt,
}

pub type AlgoResult<T> = Result<T, AlgoError>;
