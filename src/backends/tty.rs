// src/backends/tty.rs

//! Terminal input through `/dev/tty` and termios.
//!
//! Unix terminals deliver UTF-8 bytes rather than key records, so this backend
//! decodes the bytes and synthesizes one key-down record per UTF-16 unit.
//! Characters outside the BMP therefore reach the reader as surrogate pairs,
//! exactly as a console would deliver them.

use crate::backends::utf8::Utf8Decoder;
use crate::backends::ConsoleBackend;
use crate::config::InputConfig;
use crate::error::{GetchError, ModeOp, Result};
use crate::record::{KeyRecord, RawInputRecord};

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use termios::{tcsetattr, Termios, ECHO, ICANON, ISIG, TCSANOW, VMIN, VTIME};

use log::{info, trace};

pub struct TtyBackend {
    file: File,
    path: PathBuf,
    decoder: Utf8Decoder,
    read_buffer: Vec<u8>,
    /// Records decoded beyond the capacity of the previous batch.
    overflow: VecDeque<RawInputRecord>,
}

impl TtyBackend {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    fn read_bytes(&mut self, capacity: usize) -> Result<usize> {
        self.read_buffer.resize(capacity, 0);
        loop {
            match self.file.read(&mut self.read_buffer[..capacity]) {
                Ok(0) => {
                    return Err(GetchError::Read(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "terminal input closed",
                    )))
                }
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(GetchError::Read(e)),
            }
        }
    }
}

impl ConsoleBackend for TtyBackend {
    type Mode = Termios;

    fn open(config: &InputConfig) -> Result<Self> {
        let path = config.device.clone();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| GetchError::Acquisition {
                path: path.clone(),
                source,
            })?;
        info!("tty: opened {} (fd {})", path.display(), file.as_raw_fd());
        Ok(TtyBackend {
            file,
            path,
            decoder: Utf8Decoder::new(),
            read_buffer: Vec::new(),
            overflow: VecDeque::new(),
        })
    }

    fn get_mode(&self) -> Result<Termios> {
        Termios::from_fd(self.fd()).map_err(|source| GetchError::ModeAccess {
            op: ModeOp::Get,
            source,
        })
    }

    fn set_mode(&self, mode: &Termios) -> Result<()> {
        tcsetattr(self.fd(), TCSANOW, mode).map_err(|source| GetchError::ModeAccess {
            op: ModeOp::Set,
            source,
        })
    }

    fn raw_mode(&self, saved: &Termios) -> Termios {
        let mut raw = *saved;
        // No echo, no line buffering, no signal keys: Ctrl-C arrives as 0x03.
        raw.c_lflag &= !(ECHO | ICANON | ISIG | libc::IEXTEN);
        // Keep Ctrl-S/Ctrl-Q and carriage returns as typed.
        raw.c_iflag &= !(libc::IXON | libc::ICRNL);
        // Block until at least one byte is available.
        raw.c_cc[VMIN] = 1;
        raw.c_cc[VTIME] = 0;
        raw
    }

    fn read_batch(&mut self, capacity: usize) -> Result<Vec<RawInputRecord>> {
        let capacity = capacity.max(1);
        if self.overflow.is_empty() {
            let n = self.read_bytes(capacity)?;
            trace!("tty: read {} bytes: {:02X?}", n, &self.read_buffer[..n]);
            let mut chars = Vec::with_capacity(n);
            self.decoder.decode_into(&self.read_buffer[..n], &mut chars);
            self.overflow.extend(key_records(&chars));
        }
        let take = capacity.min(self.overflow.len());
        Ok(self.overflow.drain(..take).collect())
    }
}

/// One key-down record per UTF-16 unit of each character.
fn key_records(chars: &[char]) -> Vec<RawInputRecord> {
    let mut units = [0u16; 2];
    chars
        .iter()
        .flat_map(|c| c.encode_utf16(&mut units).to_vec())
        .map(|unit| {
            RawInputRecord::Key(KeyRecord {
                key_down: true,
                repeat_count: 1,
                unit,
                ..KeyRecord::default()
            })
        })
        .collect()
}
