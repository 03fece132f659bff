// src/backends/utf8.rs

//! Incremental UTF-8 decoding for byte-oriented terminals.
//! A sequence split across two reads is completed on the second one.

use log::warn;
use std::str;

/// Unicode replacement character (U+FFFD).
/// Used when encountering invalid UTF-8 sequences.
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// Outcome of feeding one byte to the decoder.
#[derive(Debug, PartialEq, Eq)]
pub enum Utf8DecodeResult {
    Decoded(char),
    /// The byte does not fit the sequence in progress. Decoder is reset.
    InvalidSequence,
    NeedsMoreBytes,
}

// --- Constants for UTF-8 byte classification ---
const UTF8_ASCII_MAX: u8 = 0x7F;
const UTF8_CONT_MIN: u8 = 0x80;
const UTF8_CONT_MAX: u8 = 0xBF;
const UTF8_2_BYTE_MIN: u8 = 0xC2; // Excludes overlong 0xC0, 0xC1
const UTF8_3_BYTE_MIN: u8 = 0xE0;
const UTF8_4_BYTE_MIN: u8 = 0xF0;
const UTF8_4_BYTE_MAX: u8 = 0xF4; // Max valid start for 4-byte sequence (RFC 3629)

#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    buffer: [u8; 4],
    len: usize,
    expected: usize,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a multi-byte sequence is waiting for continuation bytes.
    pub fn is_mid_sequence(&self) -> bool {
        self.len != 0
    }

    #[inline]
    fn reset(&mut self) {
        self.len = 0;
        self.expected = 0;
    }

    pub fn decode(&mut self, byte: u8) -> Utf8DecodeResult {
        if self.len == 0 {
            return self.decode_first_byte(byte);
        }
        self.decode_continuation_byte(byte)
    }

    /// Decodes `bytes` into `out`, substituting U+FFFD for invalid sequences.
    /// A byte that interrupts a sequence is decoded again as a fresh start.
    pub fn decode_into(&mut self, bytes: &[u8], out: &mut Vec<char>) {
        for &byte in bytes {
            let interrupted = self.is_mid_sequence();
            match self.decode(byte) {
                Utf8DecodeResult::Decoded(c) => out.push(c),
                Utf8DecodeResult::NeedsMoreBytes => {}
                Utf8DecodeResult::InvalidSequence => {
                    out.push(REPLACEMENT_CHARACTER);
                    if interrupted && !(UTF8_CONT_MIN..=UTF8_CONT_MAX).contains(&byte) {
                        match self.decode(byte) {
                            Utf8DecodeResult::Decoded(c) => out.push(c),
                            Utf8DecodeResult::NeedsMoreBytes => {}
                            Utf8DecodeResult::InvalidSequence => out.push(REPLACEMENT_CHARACTER),
                        }
                    }
                }
            }
        }
    }

    #[inline]
    fn decode_first_byte(&mut self, byte: u8) -> Utf8DecodeResult {
        let expected = match byte {
            0x00..=UTF8_ASCII_MAX => return Utf8DecodeResult::Decoded(byte as char),
            UTF8_2_BYTE_MIN..=0xDF => 2,
            UTF8_3_BYTE_MIN..=0xEF => 3,
            UTF8_4_BYTE_MIN..=UTF8_4_BYTE_MAX => 4,
            // 0x80-0xC1 (continuation / overlong) and 0xF5-0xFF
            _ => {
                warn!("utf8: invalid start byte {:#04X}", byte);
                self.reset();
                return Utf8DecodeResult::InvalidSequence;
            }
        };
        self.expected = expected;
        self.buffer[0] = byte;
        self.len = 1;
        Utf8DecodeResult::NeedsMoreBytes
    }

    #[inline]
    fn decode_continuation_byte(&mut self, byte: u8) -> Utf8DecodeResult {
        if !(UTF8_CONT_MIN..=UTF8_CONT_MAX).contains(&byte) {
            warn!("utf8: sequence interrupted by {:#04X}", byte);
            self.reset();
            return Utf8DecodeResult::InvalidSequence;
        }

        self.buffer[self.len] = byte;
        self.len += 1;

        if self.len != self.expected {
            return Utf8DecodeResult::NeedsMoreBytes;
        }

        // `from_utf8` rejects overlong forms and encoded surrogates.
        let decoded = str::from_utf8(&self.buffer[..self.len])
            .ok()
            .and_then(|s| s.chars().next());
        self.reset();

        match decoded {
            Some(c) => Utf8DecodeResult::Decoded(c),
            None => Utf8DecodeResult::InvalidSequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(chunks: &[&[u8]]) -> Vec<char> {
        let mut decoder = Utf8Decoder::new();
        let mut out = Vec::new();
        for chunk in chunks {
            decoder.decode_into(chunk, &mut out);
        }
        out
    }

    #[test]
    fn it_should_decode_ascii_and_multibyte_characters() {
        assert_eq!(decode_all(&["aé中😀".as_bytes()]), vec!['a', 'é', '中', '😀']);
    }

    #[test]
    fn it_should_complete_a_sequence_split_across_reads() {
        let bytes = "😀".as_bytes();
        let mut decoder = Utf8Decoder::new();
        let mut out = Vec::new();
        decoder.decode_into(&bytes[..2], &mut out);
        assert!(out.is_empty());
        assert!(decoder.is_mid_sequence());
        decoder.decode_into(&bytes[2..], &mut out);
        assert_eq!(out, vec!['😀']);
    }

    #[test]
    fn it_should_replace_invalid_start_bytes() {
        assert_eq!(decode_all(&[&[0x80, b'a', 0xFF]]), vec!['\u{FFFD}', 'a', '\u{FFFD}']);
    }

    #[test]
    fn it_should_restart_on_the_byte_that_interrupted_a_sequence() {
        // 0xE4 starts a 3-byte sequence; 'b' interrupts it and is still delivered.
        assert_eq!(decode_all(&[&[0xE4, b'b']]), vec!['\u{FFFD}', 'b']);
    }

    #[test]
    fn it_should_reject_encoded_surrogates() {
        // 0xED 0xA0 0x80 would be U+D800.
        assert_eq!(decode_all(&[&[0xED, 0xA0, 0x80]]), vec!['\u{FFFD}']);
    }
}
