// src/filter.rs

//! Reduces raw input records to key transitions.

use crate::keys::{InputEvent, KeyEvent};
use crate::record::{KeyRecord, RawInputRecord};
use log::trace;

/// Normalizes one raw record. Everything except key records is dropped.
pub fn normalize(record: &RawInputRecord) -> Option<InputEvent> {
    match record {
        RawInputRecord::Key(key) => Some(normalize_key(key)),
        other => {
            trace!("filter: discarding {:?}", other);
            None
        }
    }
}

/// Normalizes a whole batch, preserving arrival order.
pub fn normalize_batch(records: &[RawInputRecord]) -> Vec<InputEvent> {
    records.iter().filter_map(normalize).collect()
}

fn normalize_key(key: &KeyRecord) -> InputEvent {
    let event = KeyEvent {
        unit: key.unit,
        virtual_key: key.virtual_key,
        scan_code: key.scan_code,
        repeat_count: key.repeat_count,
        modifiers: key.control_keys,
    };
    if key.key_down {
        InputEvent::KeyDown(event)
    } else {
        InputEvent::KeyUp(event)
    }
}
