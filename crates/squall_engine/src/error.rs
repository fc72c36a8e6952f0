//! Unified error types for squall_engine

use thiserror::Error;

/// Main error type for engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// The style store has no free slot for another distinct style. The
    /// screen stays consistent up to the write that overflowed.
    #[error("style storage exhausted ({capacity} distinct styles)")]
    OutOfStyleCapacity { capacity: u16 },

    #[error("invalid screen dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
}
