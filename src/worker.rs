// src/worker.rs

//! Reading keystrokes on a dedicated thread.
//!
//! `next_char` blocks without a timeout. Hosts that need to give up waiting
//! run the reader here and wait on the channel instead; the thread itself
//! stays parked in the OS read until the next keystroke arrives.

use crate::backends::ConsoleBackend;
use crate::error::Result;
use crate::keys::CodePoint;
use crate::reader::CharReader;

use log::{debug, warn};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

pub struct ReaderThread {
    receiver: Receiver<Result<CodePoint>>,
    join_handle: Option<JoinHandle<()>>,
}

impl ReaderThread {
    /// Spawns the reader thread.
    ///
    /// The thread sends every code point in order and exits after sending the
    /// first error, or on the first send after this handle is dropped.
    pub fn spawn<B>(mut reader: CharReader<B>) -> std::io::Result<Self>
    where
        B: ConsoleBackend + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("getch-reader".to_string())
            .spawn(move || {
                debug!("Reader thread started");
                loop {
                    let next = reader.next_char();
                    let failed = next.is_err();
                    if let Err(e) = &next {
                        warn!("Reader thread stopping: {}", e);
                    }
                    if sender.send(next).is_err() {
                        debug!("Reader thread receiver gone");
                        break;
                    }
                    if failed {
                        break;
                    }
                }
                debug!("Reader thread exited");
            })?;

        Ok(ReaderThread {
            receiver,
            join_handle: Some(handle),
        })
    }

    /// Blocks for the next code point. `None` once the thread has exited.
    pub fn recv(&self) -> Option<Result<CodePoint>> {
        self.receiver.recv().ok()
    }

    /// Waits at most `timeout`. `None` means no key arrived in time or the
    /// thread has exited.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Result<CodePoint>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(next) => Some(next),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Returns a code point only if one is already waiting.
    pub fn try_recv(&self) -> Option<Result<CodePoint>> {
        match self.receiver.try_recv() {
            Ok(next) => Some(next),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// True once the thread has exited.
    pub fn is_finished(&self) -> bool {
        self.join_handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    /// Waits for the thread to exit. Only returns promptly after the thread
    /// has delivered an error.
    pub fn join(mut self) {
        if let Some(handle) = self.join_handle.take() {
            if handle.join().is_err() {
                warn!("Reader thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::{MockBackend, MockScript};
    use crate::config::Config;
    use crate::error::GetchError;
    use crate::record::{KeyRecord, RawInputRecord};
    use test_log::test;

    fn down(unit: u16) -> RawInputRecord {
        RawInputRecord::Key(KeyRecord {
            key_down: true,
            unit,
            ..KeyRecord::default()
        })
    }

    fn spawn(script: MockScript) -> ReaderThread {
        let reader = CharReader::with_opener(Config::default(), move |_| {
            Ok(MockBackend::new(script.clone()))
        });
        ReaderThread::spawn(reader).unwrap()
    }

    #[test]
    fn it_should_deliver_code_points_in_order_then_the_error() {
        let worker = spawn(MockScript::new().batch(vec![down(0x6F), down(0xD83D), down(0xDE00), down(0x6B)]));

        assert_eq!(worker.recv().unwrap().unwrap(), CodePoint::from('o'));
        assert_eq!(worker.recv().unwrap().unwrap(), CodePoint::new(0x1F600));
        assert_eq!(worker.recv().unwrap().unwrap(), CodePoint::from('k'));
        // Script exhausted: the mock fails the read and the thread stops.
        assert!(matches!(worker.recv(), Some(Err(GetchError::Read(_)))));
        assert!(worker.recv().is_none());
        worker.join();
    }

    #[test]
    fn it_should_report_nothing_after_the_thread_has_stopped() {
        let worker = spawn(MockScript::new().fail_get_mode());

        match worker.recv_timeout(Duration::from_secs(5)) {
            Some(Err(e)) => assert!(e.is_acquisition_failure()),
            other => panic!("expected an acquisition failure, got {:?}", other),
        }
        assert!(worker.recv_timeout(Duration::from_millis(50)).is_none());
        assert!(worker.try_recv().is_none());
        worker.join();
    }
}
