// src/error.rs

//! Error type shared by every layer of the keystroke reader.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by [`crate::CharReader::next_char`] and its building blocks.
///
/// Malformed surrogate sequences never produce an error; the reassembler
/// absorbs them.
#[derive(Error, Debug)]
pub enum GetchError {
    /// The terminal input stream could not be opened.
    #[error("failed to open terminal input '{}': {source}", .path.display())]
    Acquisition {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Reading or installing the terminal input mode failed.
    #[error("failed to {op} terminal input mode: {source}")]
    ModeAccess {
        op: ModeOp,
        #[source]
        source: io::Error,
    },
    /// The blocking batched read failed.
    #[error("terminal input read failed: {0}")]
    Read(#[source] io::Error),
    /// A raw record buffer was shorter than the payload its kind tag requires.
    #[error("input record of kind {kind:#06x} truncated: {len} bytes")]
    RecordDecode { kind: u16, len: usize },
    /// The configuration file could not be read or parsed.
    #[error("invalid configuration '{}': {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Which half of a mode round-trip failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeOp {
    Get,
    Set,
}

impl std::fmt::Display for ModeOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModeOp::Get => f.write_str("get"),
            ModeOp::Set => f.write_str("set"),
        }
    }
}

impl GetchError {
    /// True for failures that happen before any input could be read:
    /// opening the terminal or touching its mode flags.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            GetchError::Acquisition { .. } | GetchError::ModeAccess { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GetchError>;
