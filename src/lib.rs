//! getch-term library crate.
//!
//! Reads one keystroke at a time from the controlling terminal without
//! waiting for Enter. The terminal is switched to raw mode only for the
//! duration of each batch read, key records are filtered down to
//! character-producing key presses, and UTF-16 surrogate pairs are
//! reassembled into single code points.
//!
//! ```no_run
//! use getch_term::CharReader;
//!
//! let mut reader = CharReader::new();
//! let key = reader.next_char()?;
//! println!("pressed {}", key);
//! # Ok::<(), getch_term::GetchError>(())
//! ```

pub mod backends;
pub mod config;
pub mod error;
pub mod filter;
pub mod keys;
pub mod mode;
pub mod reader;
pub mod record;
pub mod surrogate;
pub mod worker;

pub use backends::{ConsoleBackend, PlatformBackend};
pub use config::{Config, InputConfig};
pub use error::{GetchError, Result};
pub use keys::{CodePoint, ControlKeyState, InputEvent, KeyEvent};
pub use reader::CharReader;
pub use worker::ReaderThread;
