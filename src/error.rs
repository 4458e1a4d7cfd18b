use crate::key::ArrayKey;
use thiserror::Error;

/// Failures surfaced by `PhpArray` constructors and bulk operations.
///
/// Reading or unsetting an absent key is never an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArrayError {
    #[error("initial capacity must be at least 1")]
    ZeroCapacity,
    #[error("values under keys `{left}` and `{right}` cannot be ordered")]
    Incomparable { left: ArrayKey, right: ArrayKey },
}
