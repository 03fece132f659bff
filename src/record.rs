// src/record.rs

//! Decoding of console input records.
//!
//! The OS hands back fixed 20-byte records: a 16-bit kind tag, two bytes of
//! padding, then a 16-byte payload whose shape depends on the tag. Rather than
//! reinterpreting memory, the decoder reads the tag first and then parses only
//! the matching payload with explicit little-endian reads.

use crate::error::{GetchError, Result};
use crate::keys::ControlKeyState;

/// Size of one encoded input record.
pub const INPUT_RECORD_SIZE: usize = 20;

const PAYLOAD_OFFSET: usize = 4;
const KEY_PAYLOAD_SIZE: usize = 16;

// Kind tags.
pub const KEY_EVENT: u16 = 0x0001;
pub const MOUSE_EVENT: u16 = 0x0002;
pub const WINDOW_BUFFER_SIZE_EVENT: u16 = 0x0004;
pub const MENU_EVENT: u16 = 0x0008;
pub const FOCUS_EVENT: u16 = 0x0010;

/// Key payload of an input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyRecord {
    pub key_down: bool,
    pub repeat_count: u16,
    pub virtual_key: u16,
    pub scan_code: u16,
    pub unit: u16,
    pub control_keys: ControlKeyState,
}

/// One raw input record, tagged by kind.
///
/// Only key payloads are parsed; other kinds are recognized so they can be
/// discarded without touching their payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputRecord {
    Key(KeyRecord),
    Mouse,
    WindowBufferSize,
    Menu,
    Focus,
    Unknown(u16),
}

impl RawInputRecord {
    /// Decodes one record from `bytes`, which must start at a record boundary.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let kind = read_u16(bytes, 0).ok_or(GetchError::RecordDecode {
            kind: 0,
            len: bytes.len(),
        })?;

        Ok(match kind {
            KEY_EVENT => {
                let payload = bytes
                    .get(PAYLOAD_OFFSET..PAYLOAD_OFFSET + KEY_PAYLOAD_SIZE)
                    .ok_or(GetchError::RecordDecode {
                        kind,
                        len: bytes.len(),
                    })?;
                RawInputRecord::Key(KeyRecord::decode(payload)?)
            }
            MOUSE_EVENT => RawInputRecord::Mouse,
            WINDOW_BUFFER_SIZE_EVENT => RawInputRecord::WindowBufferSize,
            MENU_EVENT => RawInputRecord::Menu,
            FOCUS_EVENT => RawInputRecord::Focus,
            other => RawInputRecord::Unknown(other),
        })
    }

    /// Decodes `count` consecutive records from a read buffer.
    pub fn decode_all(bytes: &[u8], count: usize) -> Result<Vec<Self>> {
        let needed = count * INPUT_RECORD_SIZE;
        if bytes.len() < needed {
            return Err(GetchError::RecordDecode {
                kind: 0,
                len: bytes.len(),
            });
        }
        bytes[..needed]
            .chunks_exact(INPUT_RECORD_SIZE)
            .map(RawInputRecord::decode)
            .collect()
    }
}

impl KeyRecord {
    /// Parses a 16-byte key payload:
    /// `i32 key_down, u16 repeat, u16 vk, u16 scan, u16 unit, u32 control_keys`.
    fn decode(payload: &[u8]) -> Result<Self> {
        let truncated = || GetchError::RecordDecode {
            kind: KEY_EVENT,
            len: payload.len(),
        };
        let key_down = read_u32(payload, 0).ok_or_else(truncated)? != 0;
        let repeat_count = read_u16(payload, 4).ok_or_else(truncated)?;
        let virtual_key = read_u16(payload, 6).ok_or_else(truncated)?;
        let scan_code = read_u16(payload, 8).ok_or_else(truncated)?;
        let unit = read_u16(payload, 10).ok_or_else(truncated)?;
        let control_keys = read_u32(payload, 12).ok_or_else(truncated)?;

        Ok(KeyRecord {
            key_down,
            repeat_count,
            virtual_key,
            scan_code,
            unit,
            control_keys: ControlKeyState::from_bits_retain(control_keys),
        })
    }

    /// Encodes this key as a full 20-byte input record.
    pub fn encode(&self) -> [u8; INPUT_RECORD_SIZE] {
        let mut out = [0u8; INPUT_RECORD_SIZE];
        out[0..2].copy_from_slice(&KEY_EVENT.to_le_bytes());
        let p = PAYLOAD_OFFSET;
        out[p..p + 4].copy_from_slice(&u32::from(self.key_down).to_le_bytes());
        out[p + 4..p + 6].copy_from_slice(&self.repeat_count.to_le_bytes());
        out[p + 6..p + 8].copy_from_slice(&self.virtual_key.to_le_bytes());
        out[p + 8..p + 10].copy_from_slice(&self.scan_code.to_le_bytes());
        out[p + 10..p + 12].copy_from_slice(&self.unit.to_le_bytes());
        out[p + 12..p + 16].copy_from_slice(&self.control_keys.bits().to_le_bytes());
        out
    }
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let raw = bytes.get(at..at + 2)?;
    Some(u16::from_le_bytes([raw[0], raw[1]]))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let raw = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}
