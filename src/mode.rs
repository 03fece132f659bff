// src/mode.rs

//! Scoped raw-mode switching.
//!
//! The terminal is only held in raw mode for the duration of one batch read,
//! so other processes sharing it see cooked mode the rest of the time.

use crate::backends::ConsoleBackend;
use crate::error::Result;
use log::{debug, warn};

/// Restores the saved input mode when dropped.
pub struct RawModeGuard<'a, B: ConsoleBackend> {
    backend: &'a mut B,
    saved: B::Mode,
}

impl<'a, B: ConsoleBackend> RawModeGuard<'a, B> {
    /// Captures the current mode and installs raw mode.
    ///
    /// If either step fails nothing is restored, since nothing was changed.
    pub fn engage(backend: &'a mut B) -> Result<Self> {
        let saved = backend.get_mode()?;
        let raw = backend.raw_mode(&saved);
        backend.set_mode(&raw)?;
        debug!("mode: raw input enabled (saved {:?})", saved);
        Ok(RawModeGuard { backend, saved })
    }

    pub fn backend(&mut self) -> &mut B {
        &mut *self.backend
    }

    pub fn saved(&self) -> &B::Mode {
        &self.saved
    }
}

impl<B: ConsoleBackend> Drop for RawModeGuard<'_, B> {
    fn drop(&mut self) {
        match self.backend.set_mode(&self.saved) {
            Ok(()) => debug!("mode: restored {:?}", self.saved),
            Err(e) => warn!("mode: failed to restore {:?}: {}", self.saved, e),
        }
    }
}

/// Runs `op` with the terminal in raw mode, restoring the previous mode on
/// every exit path.
pub fn with_raw_mode<B, T, F>(backend: &mut B, op: F) -> Result<T>
where
    B: ConsoleBackend,
    F: FnOnce(&mut B) -> Result<T>,
{
    let mut guard = RawModeGuard::engage(backend)?;
    op(guard.backend())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::{MockBackend, MockCall, MockScript, MOCK_COOKED_MODE, MOCK_RAW_MODE};
    use crate::error::GetchError;
    use test_log::test;

    #[test]
    fn it_should_restore_the_saved_mode_after_the_operation() {
        let script = MockScript::new().batch(vec![]);
        let mut backend = MockBackend::new(script.clone());

        let value = with_raw_mode(&mut backend, |b| {
            b.read_batch(10)?;
            Ok(7)
        })
        .unwrap();

        assert_eq!(value, 7);
        assert_eq!(
            script.calls(),
            vec![
                MockCall::GetMode,
                MockCall::SetMode(MOCK_RAW_MODE),
                MockCall::Read,
                MockCall::SetMode(MOCK_COOKED_MODE),
            ]
        );
    }

    #[test]
    fn it_should_restore_the_saved_mode_when_the_operation_fails() {
        let script = MockScript::new().read_error(std::io::ErrorKind::BrokenPipe);
        let mut backend = MockBackend::new(script.clone());

        let err = with_raw_mode(&mut backend, |b| b.read_batch(10)).unwrap_err();

        assert!(matches!(err, GetchError::Read(_)));
        assert_eq!(script.calls().last(), Some(&MockCall::SetMode(MOCK_COOKED_MODE)));
    }

    #[test]
    fn it_should_not_run_the_operation_when_the_mode_cannot_be_read() {
        let script = MockScript::new().fail_get_mode();
        let mut backend = MockBackend::new(script.clone());
        let mut ran = false;

        let err = with_raw_mode(&mut backend, |_| {
            ran = true;
            Ok(())
        })
        .unwrap_err();

        assert!(err.is_acquisition_failure());
        assert!(!ran);
        assert_eq!(script.calls(), vec![MockCall::GetMode]);
    }

    #[test]
    fn it_should_not_run_the_operation_when_raw_mode_cannot_be_installed() {
        let script = MockScript::new().fail_set_raw();
        let mut backend = MockBackend::new(script.clone());

        let err = with_raw_mode(&mut backend, |b| b.read_batch(10)).unwrap_err();

        assert!(matches!(err, GetchError::ModeAccess { .. }));
        assert!(!script.calls().contains(&MockCall::Read));
    }

    #[test]
    fn it_should_swallow_restore_failures() {
        let script = MockScript::new().batch(vec![]).fail_restore();
        let mut backend = MockBackend::new(script.clone());

        let records = with_raw_mode(&mut backend, |b| b.read_batch(10)).unwrap();

        assert!(records.is_empty());
        assert_eq!(script.calls().last(), Some(&MockCall::SetMode(MOCK_COOKED_MODE)));
    }
}
