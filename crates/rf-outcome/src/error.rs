//! Error types for the outcome engine

use thiserror::Error;

/// Failure reported by a [`RandomSource`](crate::random::RandomSource)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RandomSourceError {
    #[error("random source exhausted after {0} draws")]
    Exhausted(usize),

    #[error("recorded draw {value} is out of range 0..{upper}")]
    OutOfRange { value: u64, upper: u64 },

    #[error("invalid upper bound {0}")]
    InvalidBound(u64),

    #[error("random service error: {0}")]
    Service(String),
}

/// Runtime error raised while playing a spin
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("random source failed: {0}")]
    ExhaustedRandomSource(#[from] RandomSourceError),

    #[error("weighted table is empty")]
    EmptyWeightTable,

    #[error("value not found in weighted table")]
    ValueNotFound,

    #[error("weighted table total overflows")]
    WeightOverflow,

    #[error("component {component}: no respin entry for symbol count {count}")]
    UnmappedSymbolCount { component: String, count: usize },

    #[error("unknown component handle {0}")]
    InvalidHandle(usize),

    #[error("unknown component: {0}")]
    UnknownComponent(String),

    #[error("reel set not found: {0}")]
    UnknownReelSet(String),

    #[error("component {0} needs a scene but the play result has none")]
    NoScene(String),

    #[error("spin exceeded {0} component steps")]
    StepLimitExceeded(usize),

    #[error("award {award} failed: {reason}")]
    Award { award: String, reason: String },
}

/// Error raised while loading and validating a game configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("unknown component: {0}")]
    UnknownComponent(String),

    #[error("duplicate component: {0}")]
    DuplicateComponent(String),

    #[error("invalid trigger type: {0}")]
    InvalidTriggerType(String),

    #[error("invalid bet type: {0}")]
    InvalidBetType(String),

    #[error("invalid win direction: {0}")]
    InvalidDirection(String),

    #[error("empty weighted table: {0}")]
    EmptyWeightTable(String),

    #[error("weighted table total overflows: {0}")]
    WeightOverflow(String),

    #[error("component {component}: invalid respin table entry {entry}")]
    InvalidRespinEntry { component: String, entry: String },

    #[error("component {0} needs a line set but the game defines none")]
    MissingLines(String),

    #[error("unknown reel set: {0}")]
    UnknownReelSet(String),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for runtime operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
