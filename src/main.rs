// src/main.rs

use getch_term::{config::CONFIG, CharReader, CodePoint};

use anyhow::Context;
use log::info;
use std::io::Write;

const QUIT_KEY: CodePoint = CodePoint::new('q' as u32);
const END_OF_TRANSMISSION: CodePoint = CodePoint::new(0x04); // Ctrl-D

/// Echoes the code point of every keystroke until `q` or Ctrl-D.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting getch-term with {:?}", CONFIG.input);

    let mut reader = CharReader::new();
    let mut stdout = std::io::stdout();

    writeln!(stdout, "ready: press keys, 'q' or Ctrl-D to quit")?;
    stdout.flush()?;

    loop {
        let key = reader
            .next_char()
            .context("Failed to read a keystroke from the terminal")?;
        match key.to_char().filter(|c| !c.is_control()) {
            Some(c) => writeln!(stdout, "{} '{}'", key, c)?,
            None => writeln!(stdout, "{}", key)?,
        }
        stdout.flush()?;

        if key == QUIT_KEY || key == END_OF_TRANSMISSION {
            info!("Quit key received. Exiting.");
            break;
        }
    }

    Ok(())
}
