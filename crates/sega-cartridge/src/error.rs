use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SaveStateError>;

/// Reasons a save-state block is refused. Live state is never touched when
/// one of these is returned.
#[derive(Debug, Error)]
pub enum SaveStateError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("save-state block truncated (need {expected} bytes, have {found})")]
    Truncated { expected: usize, found: usize },

    #[error("unexpected block tag {found:?} (expected {expected:?})")]
    TagMismatch { expected: [u8; 4], found: [u8; 4] },

    #[error("block length {found} does not match expected {expected}")]
    LengthMismatch { expected: u32, found: u32 },

    #[error("unsupported block version {0}")]
    UnsupportedVersion(u16),

    #[error("reserved child pointer is {0:#010X}, must be zero")]
    NonZeroChild(u32),
}
