// src/backends/mod.rs
// Declares backend modules and defines the common trait.

pub mod mock;
pub mod utf8;

#[cfg(unix)]
pub mod tty;
#[cfg(windows)]
pub mod conin;

pub use mock::{MockBackend, MockCall, MockScript};

#[cfg(unix)]
pub use tty::TtyBackend;
#[cfg(windows)]
pub use conin::ConinBackend;

/// Backend compiled in for the current platform.
#[cfg(unix)]
pub type PlatformBackend = TtyBackend;
#[cfg(windows)]
pub type PlatformBackend = ConinBackend;

use crate::config::InputConfig;
use crate::error::Result;
use crate::record::RawInputRecord;
use std::fmt;

/// Batch capacity used when the configuration does not override it.
pub const DEFAULT_BATCH_CAPACITY: usize = 10;

/// A terminal input source the reader can drive.
///
/// Implementations own the OS handle. The reader only ever calls these
/// methods from one thread.
pub trait ConsoleBackend {
    /// Saved input-mode flags.
    type Mode: Copy + fmt::Debug;

    /// Opens the terminal input stream.
    fn open(config: &InputConfig) -> Result<Self>
    where
        Self: Sized;

    /// Reads the current input mode.
    fn get_mode(&self) -> Result<Self::Mode>;

    /// Installs an input mode.
    fn set_mode(&self, mode: &Self::Mode) -> Result<()>;

    /// Derives the unbuffered, unechoed mode from `saved`.
    fn raw_mode(&self, saved: &Self::Mode) -> Self::Mode;

    /// Blocks until at least one record is available and returns at most
    /// `capacity` of them, in delivery order.
    fn read_batch(&mut self, capacity: usize) -> Result<Vec<RawInputRecord>>;
}
