// src/reader/tests.rs

use super::*;
use crate::backends::mock::{MockBackend, MockCall, MockScript, MOCK_COOKED_MODE, MOCK_RAW_MODE};
use crate::error::GetchError;
use crate::keys::ControlKeyState;
use crate::record::{KeyRecord, RawInputRecord};

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_log::test;

fn down(unit: u16) -> RawInputRecord {
    RawInputRecord::Key(KeyRecord {
        key_down: true,
        repeat_count: 1,
        unit,
        ..KeyRecord::default()
    })
}

fn up(unit: u16) -> RawInputRecord {
    RawInputRecord::Key(KeyRecord {
        key_down: false,
        repeat_count: 1,
        unit,
        ..KeyRecord::default()
    })
}

fn shift_alone() -> RawInputRecord {
    RawInputRecord::Key(KeyRecord {
        key_down: true,
        virtual_key: 0x10,
        scan_code: 0x2A,
        unit: 0,
        control_keys: ControlKeyState::SHIFT,
        ..KeyRecord::default()
    })
}

fn reader_for(script: &MockScript) -> CharReader<MockBackend> {
    let script = script.clone();
    CharReader::with_opener(Config::default(), move |_| Ok(MockBackend::new(script.clone())))
}

#[test]
fn it_should_return_characters_and_skip_key_up_events() {
    let script = MockScript::new().batch(vec![down(0x41), up(0x41), down(0x31)]);
    let mut reader = reader_for(&script);

    assert_eq!(reader.next_char().unwrap(), CodePoint::from('A'));
    assert_eq!(reader.next_char().unwrap(), CodePoint::from('1'));
    assert_eq!(script.reads(), 1);
}

#[test]
fn it_should_reassemble_a_surrogate_pair_from_one_batch() {
    let script = MockScript::new().batch(vec![down(0xD83D), down(0xDE00)]);
    let mut reader = reader_for(&script);

    let code_point = reader.next_char().unwrap();

    assert_eq!(code_point, CodePoint::new(0x1F600));
    assert_eq!(code_point.to_char(), Some('😀'));
}

#[test]
fn it_should_reassemble_a_surrogate_pair_split_across_batches() {
    let script = MockScript::new()
        .batch(vec![down(0xD83D)])
        .batch(vec![up(0xD83D), down(0xDE00)]);
    let mut reader = reader_for(&script);

    assert_eq!(reader.next_char().unwrap(), CodePoint::new(0x1F600));
    assert_eq!(script.reads(), 2);
}

#[test]
fn it_should_read_the_next_batch_when_a_batch_has_no_text() {
    let script = MockScript::new()
        .batch(vec![up(0x61), shift_alone(), up(0)])
        .batch(vec![down(0x62)]);
    let mut reader = reader_for(&script);

    assert_eq!(reader.next_char().unwrap(), CodePoint::from('b'));
    assert_eq!(script.reads(), 2);
}

#[test]
fn it_should_return_characters_in_arrival_order() {
    let script = MockScript::new().batch(vec![down(0x78), down(0x79), down(0x7A)]);
    let mut reader = reader_for(&script);

    let got: Vec<_> = (0..3).map(|_| reader.next_char().unwrap()).collect();

    assert_eq!(
        got,
        vec![CodePoint::from('x'), CodePoint::from('y'), CodePoint::from('z')]
    );
    assert_eq!(reader.buffered_events(), 0);
}

#[test]
fn it_should_keep_reading_in_raw_mode_while_batches_carry_no_keys() {
    let script = MockScript::new()
        .batch(vec![RawInputRecord::WindowBufferSize, RawInputRecord::Mouse])
        .batch(vec![down(0x71)]);
    let mut reader = reader_for(&script);

    assert_eq!(reader.next_char().unwrap(), CodePoint::from('q'));
    assert_eq!(
        script.calls(),
        vec![
            MockCall::GetMode,
            MockCall::SetMode(MOCK_RAW_MODE),
            MockCall::Read,
            MockCall::Read,
            MockCall::SetMode(MOCK_COOKED_MODE),
        ]
    );
}

#[test]
fn it_should_switch_modes_around_every_refill() {
    let script = MockScript::new().batch(vec![down(0x61)]).batch(vec![down(0x62)]);
    let mut reader = reader_for(&script);

    reader.next_char().unwrap();
    reader.next_char().unwrap();

    let raw_switches = script
        .calls()
        .iter()
        .filter(|c| **c == MockCall::SetMode(MOCK_RAW_MODE))
        .count();
    let restores = script
        .calls()
        .iter()
        .filter(|c| **c == MockCall::SetMode(MOCK_COOKED_MODE))
        .count();
    assert_eq!((raw_switches, restores), (2, 2));
}

#[test]
fn it_should_acquire_the_backend_lazily_and_only_once() {
    let script = MockScript::new()
        .batch(vec![down(0x61)])
        .batch(vec![down(0x62)])
        .batch(vec![down(0x63)]);
    let opened = Arc::new(AtomicUsize::new(0));
    let counter = opened.clone();
    let shared = script.clone();
    let mut reader = CharReader::with_opener(Config::default(), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(MockBackend::new(shared.clone()))
    });

    assert!(!reader.is_acquired());
    assert_eq!(opened.load(Ordering::SeqCst), 0);

    for expected in ['a', 'b', 'c'] {
        assert_eq!(reader.next_char().unwrap(), CodePoint::from(expected));
    }

    assert!(reader.is_acquired());
    assert_eq!(opened.load(Ordering::SeqCst), 1);
}

#[test]
fn it_should_abort_when_the_terminal_cannot_be_opened() {
    let mut reader: CharReader<MockBackend> = CharReader::with_opener(Config::default(), |config| {
        Err(GetchError::Acquisition {
            path: config.device.clone(),
            source: io::Error::new(io::ErrorKind::NotFound, "no terminal"),
        })
    });

    let err = reader.next_char().unwrap_err();

    assert!(err.is_acquisition_failure());
    assert!(!reader.is_acquired());
}

#[test]
fn it_should_abort_without_reading_when_the_mode_cannot_be_read() {
    let script = MockScript::new().batch(vec![down(0x61)]).fail_get_mode();
    let mut reader = reader_for(&script);

    let err = reader.next_char().unwrap_err();

    assert!(err.is_acquisition_failure());
    assert!(matches!(err, GetchError::ModeAccess { .. }));
    assert_eq!(script.reads(), 0);
}

#[test]
fn it_should_surface_read_failures_after_restoring_the_mode() {
    let script = MockScript::new().read_error(io::ErrorKind::BrokenPipe);
    let mut reader = reader_for(&script);

    let err = reader.next_char().unwrap_err();

    assert!(matches!(err, GetchError::Read(_)));
    assert!(!err.is_acquisition_failure());
    assert_eq!(script.calls().last(), Some(&MockCall::SetMode(MOCK_COOKED_MODE)));
}

#[test]
fn it_should_honor_the_configured_batch_capacity() {
    let script = MockScript::new().batch(vec![down(0x61), down(0x62), down(0x63)]);
    let shared = script.clone();
    let config = Config::from_json(r#"{ "input": { "batch_capacity": 2 } }"#).unwrap();
    let mut reader =
        CharReader::with_opener(config, move |_| Ok(MockBackend::new(shared.clone())));

    assert_eq!(reader.next_char().unwrap(), CodePoint::from('a'));
    assert_eq!(reader.buffered_events(), 1);
    assert_eq!(reader.next_char().unwrap(), CodePoint::from('b'));
    assert_eq!(reader.next_char().unwrap(), CodePoint::from('c'));
    assert_eq!(script.reads(), 2);
}

#[test]
fn it_should_stop_the_char_iterator_after_an_error() {
    let script = MockScript::new().batch(vec![down(0x68), down(0x69)]);
    let mut reader = reader_for(&script);

    let results: Vec<_> = reader.chars().take(5).collect();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap(), &CodePoint::from('h'));
    assert_eq!(results[1].as_ref().unwrap(), &CodePoint::from('i'));
    assert!(results[2].is_err());
}
