// tests/pty_end_to_end.rs

//! Drives the `getch-term` binary through a pseudo-terminal, which becomes
//! its controlling terminal, so `/dev/tty` and termios are exercised for real.

#![cfg(target_os = "linux")]

use std::thread;
use std::time::Duration;

const BINARY: &str = env!("CARGO_BIN_EXE_getch-term");

#[test]
fn it_should_echo_code_points_without_waiting_for_enter() -> Result<(), rexpect::error::Error> {
    let mut session = rexpect::spawn(BINARY, Some(10_000))?;
    session.exp_string("ready")?;
    thread::sleep(Duration::from_millis(100));

    session.send("a")?;
    session.flush()?;
    session.exp_string("U+0061 'a'")?;

    session.send("😀")?;
    session.flush()?;
    session.exp_string("U+1F600")?;

    session.send("q")?;
    session.flush()?;
    session.exp_string("U+0071 'q'")?;
    session.exp_eof()?;
    Ok(())
}
