// src/surrogate.rs

//! Reassembly of UTF-16 surrogate pairs delivered one key event at a time.

use crate::keys::CodePoint;
use log::warn;

const HIGH_SURROGATES: std::ops::RangeInclusive<u16> = 0xD800..=0xDBFF;
const LOW_SURROGATES: std::ops::RangeInclusive<u16> = 0xDC00..=0xDFFF;
const SUPPLEMENTARY_BASE: u32 = 0x1_0000;

pub fn is_high_surrogate(unit: u16) -> bool {
    HIGH_SURROGATES.contains(&unit)
}

pub fn is_low_surrogate(unit: u16) -> bool {
    LOW_SURROGATES.contains(&unit)
}

/// Decodes a pending high surrogate followed by `low`.
///
/// Anything other than a valid pair decodes to U+FFFD.
pub fn decode_pair(high: u16, low: u16) -> CodePoint {
    if is_high_surrogate(high) && is_low_surrogate(low) {
        let hi = u32::from(high - *HIGH_SURROGATES.start());
        let lo = u32::from(low - *LOW_SURROGATES.start());
        CodePoint::new(SUPPLEMENTARY_BASE + ((hi << 10) | lo))
    } else {
        CodePoint::REPLACEMENT
    }
}

/// Pure transition: feeds `unit` against the `pending` high surrogate and
/// returns the emitted code point (if any) plus the new pending state.
///
/// A new high surrogate supersedes a stale pending one. Otherwise a pending
/// surrogate is combined with whatever arrives next.
pub fn reassemble(unit: u16, pending: Option<u16>) -> (Option<CodePoint>, Option<u16>) {
    match pending {
        Some(stale) if is_high_surrogate(unit) => {
            warn!(
                "surrogate: dropping unpaired high surrogate {:#06X} superseded by {:#06X}",
                stale, unit
            );
            (None, Some(unit))
        }
        Some(high) => (Some(decode_pair(high, unit)), None),
        None if is_high_surrogate(unit) => (None, Some(unit)),
        None => (Some(CodePoint::from(unit)), None),
    }
}

/// Holds at most one high surrogate between calls.
#[derive(Debug, Clone, Default)]
pub struct SurrogateReassembler {
    pending: Option<u16>,
}

impl SurrogateReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one character unit; `None` means a high surrogate is now pending.
    pub fn consume(&mut self, unit: u16) -> Option<CodePoint> {
        let (emitted, pending) = reassemble(unit, self.pending);
        self.pending = pending;
        emitted
    }

    pub fn pending(&self) -> Option<u16> {
        self.pending
    }
}
