// src/backends/mock.rs

//! Scripted backend for driving the reader without a terminal.

use crate::backends::ConsoleBackend;
use crate::config::InputConfig;
use crate::error::{GetchError, ModeOp, Result};
use crate::record::RawInputRecord;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

/// Mode the mock reports before any change (line input + echo + processed).
pub const MOCK_COOKED_MODE: u32 = 0x0007;
/// Mode the mock derives for raw reads.
pub const MOCK_RAW_MODE: u32 = 0x0000;

/// Every backend interaction, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    GetMode,
    SetMode(u32),
    Read,
}

#[derive(Debug)]
enum MockStep {
    Batch(Vec<RawInputRecord>),
    Fail(io::ErrorKind),
}

#[derive(Debug, Default)]
struct MockState {
    steps: VecDeque<MockStep>,
    calls: Vec<MockCall>,
    fail_get_mode: bool,
    fail_set_raw: bool,
    fail_restore: bool,
}

/// Shared script and call log. Clones observe the same state, so a test can
/// keep one while the reader owns the backend.
#[derive(Debug, Clone, Default)]
pub struct MockScript {
    state: Arc<Mutex<MockState>>,
}

impl MockScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one batch returned by the next read.
    pub fn batch(self, records: Vec<RawInputRecord>) -> Self {
        self.lock().steps.push_back(MockStep::Batch(records));
        self
    }

    /// Queues a failing read.
    pub fn read_error(self, kind: io::ErrorKind) -> Self {
        self.lock().steps.push_back(MockStep::Fail(kind));
        self
    }

    pub fn fail_get_mode(self) -> Self {
        self.lock().fail_get_mode = true;
        self
    }

    /// Makes installing the raw mode fail.
    pub fn fail_set_raw(self) -> Self {
        self.lock().fail_set_raw = true;
        self
    }

    /// Makes restoring the saved mode fail.
    pub fn fail_restore(self) -> Self {
        self.lock().fail_restore = true;
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn reads(&self) -> usize {
        self.lock().calls.iter().filter(|c| **c == MockCall::Read).count()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the log from the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct MockBackend {
    script: MockScript,
}

impl MockBackend {
    pub fn new(script: MockScript) -> Self {
        Self { script }
    }

    pub fn script(&self) -> &MockScript {
        &self.script
    }
}

fn injected(kind: io::ErrorKind) -> io::Error {
    io::Error::new(kind, "injected by mock backend")
}

impl ConsoleBackend for MockBackend {
    type Mode = u32;

    fn open(_config: &InputConfig) -> Result<Self> {
        Ok(Self::new(MockScript::new()))
    }

    fn get_mode(&self) -> Result<u32> {
        let mut state = self.script.lock();
        state.calls.push(MockCall::GetMode);
        if state.fail_get_mode {
            return Err(GetchError::ModeAccess {
                op: ModeOp::Get,
                source: injected(io::ErrorKind::PermissionDenied),
            });
        }
        Ok(MOCK_COOKED_MODE)
    }

    fn set_mode(&self, mode: &u32) -> Result<()> {
        let mut state = self.script.lock();
        state.calls.push(MockCall::SetMode(*mode));
        let fail = if *mode == MOCK_RAW_MODE {
            state.fail_set_raw
        } else {
            state.fail_restore
        };
        if fail {
            return Err(GetchError::ModeAccess {
                op: ModeOp::Set,
                source: injected(io::ErrorKind::PermissionDenied),
            });
        }
        Ok(())
    }

    fn raw_mode(&self, _saved: &u32) -> u32 {
        MOCK_RAW_MODE
    }

    fn read_batch(&mut self, capacity: usize) -> Result<Vec<RawInputRecord>> {
        let mut state = self.script.lock();
        state.calls.push(MockCall::Read);
        match state.steps.pop_front() {
            Some(MockStep::Batch(mut records)) => {
                if records.len() > capacity {
                    let rest = records.split_off(capacity);
                    state.steps.push_front(MockStep::Batch(rest));
                }
                Ok(records)
            }
            Some(MockStep::Fail(kind)) => Err(GetchError::Read(injected(kind))),
            // An exhausted script would block forever on a real terminal.
            None => Err(GetchError::Read(injected(io::ErrorKind::UnexpectedEof))),
        }
    }
}
