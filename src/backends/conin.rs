// src/backends/conin.rs

//! Console input through `CONIN$` and `ReadConsoleInputW`.

use crate::backends::ConsoleBackend;
use crate::config::InputConfig;
use crate::error::{GetchError, ModeOp, Result};
use crate::record::{RawInputRecord, INPUT_RECORD_SIZE};

use std::io;
use std::os::windows::io::{AsRawHandle, FromRawHandle, OwnedHandle};
use std::path::PathBuf;

use windows_sys::Win32::Foundation::{GENERIC_READ, GENERIC_WRITE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows_sys::Win32::System::Console::{
    GetConsoleMode, ReadConsoleInputW, SetConsoleMode, CONSOLE_MODE, INPUT_RECORD,
};

use log::{info, trace};

const CONSOLE_INPUT_NAME: &str = "CONIN$";

/// Raw mode: no line input, no echo, no processed input and no
/// window-resize records.
const RAW_CONSOLE_MODE: CONSOLE_MODE = 0;

const WORDS_PER_RECORD: usize = INPUT_RECORD_SIZE / 4;

pub struct ConinBackend {
    handle: OwnedHandle,
    /// Record storage, kept as `u32` words for the record's 4-byte alignment.
    words: Vec<u32>,
}

impl ConinBackend {
    fn raw(&self) -> windows_sys::Win32::Foundation::HANDLE {
        self.handle.as_raw_handle()
    }
}

impl ConsoleBackend for ConinBackend {
    type Mode = CONSOLE_MODE;

    fn open(_config: &InputConfig) -> Result<Self> {
        let name: Vec<u16> = CONSOLE_INPUT_NAME
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();
        // SAFETY: `name` is NUL-terminated and outlives the call.
        let handle = unsafe {
            CreateFileW(
                name.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                std::ptr::null(),
                OPEN_EXISTING,
                0,
                std::ptr::null_mut(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(GetchError::Acquisition {
                path: PathBuf::from(CONSOLE_INPUT_NAME),
                source: io::Error::last_os_error(),
            });
        }
        info!("conin: opened {}", CONSOLE_INPUT_NAME);
        Ok(ConinBackend {
            // SAFETY: `handle` is valid and owned by nobody else.
            handle: unsafe { OwnedHandle::from_raw_handle(handle) },
            words: Vec::new(),
        })
    }

    fn get_mode(&self) -> Result<CONSOLE_MODE> {
        let mut mode: CONSOLE_MODE = 0;
        // SAFETY: `mode` is a valid out-pointer for the duration of the call.
        if unsafe { GetConsoleMode(self.raw(), &mut mode) } == 0 {
            return Err(GetchError::ModeAccess {
                op: ModeOp::Get,
                source: io::Error::last_os_error(),
            });
        }
        Ok(mode)
    }

    fn set_mode(&self, mode: &CONSOLE_MODE) -> Result<()> {
        // SAFETY: plain value call on an owned console handle.
        if unsafe { SetConsoleMode(self.raw(), *mode) } == 0 {
            return Err(GetchError::ModeAccess {
                op: ModeOp::Set,
                source: io::Error::last_os_error(),
            });
        }
        Ok(())
    }

    fn raw_mode(&self, _saved: &CONSOLE_MODE) -> CONSOLE_MODE {
        RAW_CONSOLE_MODE
    }

    fn read_batch(&mut self, capacity: usize) -> Result<Vec<RawInputRecord>> {
        let capacity = capacity.max(1);
        self.words.resize(capacity * WORDS_PER_RECORD, 0);
        let mut read: u32 = 0;
        let handle = self.raw();
        // SAFETY: `words` holds `capacity` records' worth of 4-byte aligned
        // storage, and the OS writes at most `capacity` records into it.
        let ok = unsafe {
            ReadConsoleInputW(
                handle,
                self.words.as_mut_ptr().cast::<INPUT_RECORD>(),
                capacity as u32,
                &mut read,
            )
        };
        if ok == 0 {
            return Err(GetchError::Read(io::Error::last_os_error()));
        }

        let count = (read as usize).min(capacity);
        let bytes: Vec<u8> = self.words[..count * WORDS_PER_RECORD]
            .iter()
            .flat_map(|word| word.to_ne_bytes())
            .collect();
        trace!("conin: read {} records", count);
        RawInputRecord::decode_all(&bytes, count)
    }
}
