//! Result aliases shared across the crate.

/// The crate-wide error type.
pub type Err = anyhow::Error;
/// A result carrying the crate-wide error.
pub type Res<T> = Result<T, Err>;
/// A result with no value on success.
pub type Void = Res<()>;
