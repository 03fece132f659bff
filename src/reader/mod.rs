// src/reader/mod.rs

//! The public keystroke reader.
//!
//! `CharReader` owns the backend, the current event batch, and the pending
//! surrogate. The backend is opened on the first `next_char` call and kept
//! for the reader's lifetime. Each refill puts the terminal in raw mode for
//! just one batch read and restores it afterwards.

use crate::backends::{ConsoleBackend, PlatformBackend};
use crate::config::{Config, InputConfig, CONFIG};
use crate::error::Result;
use crate::filter::normalize_batch;
use crate::keys::{CodePoint, InputEvent};
use crate::mode::with_raw_mode;
use crate::surrogate::SurrogateReassembler;

use log::{debug, trace};

#[cfg(test)]
mod tests;

/// Opens the backend on first use.
pub type BackendOpener<B> = Box<dyn Fn(&InputConfig) -> Result<B> + Send>;

pub struct CharReader<B: ConsoleBackend> {
    config: InputConfig,
    opener: BackendOpener<B>,
    backend: Option<B>,
    events: Vec<InputEvent>,
    cursor: usize,
    surrogates: SurrogateReassembler,
}

impl CharReader<PlatformBackend> {
    /// A reader for the platform terminal using the global configuration.
    pub fn new() -> Self {
        Self::with_config((*CONFIG).clone())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_opener(config, PlatformBackend::open)
    }
}

impl Default for CharReader<PlatformBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ConsoleBackend> CharReader<B> {
    /// A reader whose backend is produced by `opener` on first use.
    pub fn with_opener<F>(config: Config, opener: F) -> Self
    where
        F: Fn(&InputConfig) -> Result<B> + Send + 'static,
    {
        CharReader {
            config: config.sanitized().input,
            opener: Box::new(opener),
            backend: None,
            events: Vec::new(),
            cursor: 0,
            surrogates: SurrogateReassembler::new(),
        }
    }

    /// Blocks until a character-producing key is pressed and returns its
    /// fully reassembled code point.
    ///
    /// Key-up events and keys without text (Shift alone) are skipped. A high
    /// surrogate is held until the next unit arrives, possibly in a later
    /// batch.
    pub fn next_char(&mut self) -> Result<CodePoint> {
        loop {
            let event = self.next_event()?;
            let Some(unit) = event.text_unit() else {
                trace!("reader: skipping {:?}", event);
                continue;
            };
            if let Some(code_point) = self.surrogates.consume(unit) {
                trace!("reader: {}", code_point);
                return Ok(code_point);
            }
        }
    }

    /// Endless iterator over `next_char`, ending after the first error.
    pub fn chars(&mut self) -> Chars<'_, B> {
        Chars {
            reader: self,
            failed: false,
        }
    }

    /// True once the backend has been opened.
    pub fn is_acquired(&self) -> bool {
        self.backend.is_some()
    }

    /// Events read from the OS but not yet consumed.
    pub fn buffered_events(&self) -> usize {
        self.events.len() - self.cursor
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    fn next_event(&mut self) -> Result<InputEvent> {
        while self.cursor >= self.events.len() {
            self.refill()?;
        }
        let event = self.events[self.cursor];
        self.cursor += 1;
        Ok(event)
    }

    /// Replaces the exhausted batch. Reads repeat inside one raw-mode scope
    /// until a batch contains at least one key event.
    fn refill(&mut self) -> Result<()> {
        let capacity = self.config.batch_capacity;
        let backend = self.acquire()?;
        let events = with_raw_mode(backend, |backend| loop {
            let records = backend.read_batch(capacity)?;
            let events = normalize_batch(&records);
            trace!(
                "reader: {} records -> {} key events",
                records.len(),
                events.len()
            );
            if !events.is_empty() {
                return Ok(events);
            }
        })?;
        self.events = events;
        self.cursor = 0;
        Ok(())
    }

    fn acquire(&mut self) -> Result<&mut B> {
        let backend = match self.backend.take() {
            Some(backend) => backend,
            None => {
                debug!("reader: acquiring terminal input");
                (self.opener)(&self.config)?
            }
        };
        Ok(self.backend.insert(backend))
    }
}

/// Iterator returned by [`CharReader::chars`].
pub struct Chars<'a, B: ConsoleBackend> {
    reader: &'a mut CharReader<B>,
    failed: bool,
}

impl<B: ConsoleBackend> Iterator for Chars<'_, B> {
    type Item = Result<CodePoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.reader.next_char();
        self.failed = next.is_err();
        Some(next)
    }
}
