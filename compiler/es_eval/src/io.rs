//! Where `print` writes and where `input` reads.
//!
//! Both are enum-dispatched: scripts call `print` in hot loops, and the set of
//! destinations is closed (process streams, in-memory buffers, nothing).

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Output destination for `print` and `input` prompts.
#[derive(Default)]
pub enum PrintHandler {
    #[default]
    Stdout,
    /// Captures everything, for tests and embedders.
    Buffer(Mutex<String>),
    Silent,
}

impl PrintHandler {
    pub fn buffer() -> Self {
        PrintHandler::Buffer(Mutex::new(String::new()))
    }

    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout => println!("{msg}"),
            Self::Buffer(buf) => {
                let mut buf = buf.lock();
                buf.push_str(msg);
                buf.push('\n');
            }
            Self::Silent => {}
        }
    }

    /// Write without a trailing newline, flushing stdout so prompts show up.
    pub fn print(&self, msg: &str) {
        match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                // A closed stdout only loses the prompt.
                let _ = out.write_all(msg.as_bytes()).and_then(|()| out.flush());
            }
            Self::Buffer(buf) => buf.lock().push_str(msg),
            Self::Silent => {}
        }
    }

    /// Captured output; empty for `Stdout` and `Silent`.
    pub fn output(&self) -> String {
        match self {
            Self::Buffer(buf) => buf.lock().clone(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(buf) = self {
            buf.lock().clear();
        }
    }
}

/// Source of lines for `input`.
#[derive(Default)]
pub enum InputHandler {
    #[default]
    Stdin,
    /// Pre-seeded lines, consumed front to back.
    Scripted(Mutex<VecDeque<String>>),
    /// Every read reports end of input.
    Closed,
}

impl InputHandler {
    pub fn scripted<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InputHandler::Scripted(Mutex::new(lines.into_iter().map(Into::into).collect()))
    }

    /// Next line without its terminator, or `None` at end of input.
    pub fn read_line(&self) -> Option<String> {
        match self {
            Self::Stdin => {
                let mut line = String::new();
                match std::io::stdin().lock().read_line(&mut line) {
                    Ok(0) | Err(_) => None,
                    Ok(_) => {
                        let trimmed = line.trim_end_matches(['\n', '\r']).len();
                        line.truncate(trimmed);
                        Some(line)
                    }
                }
            }
            Self::Scripted(lines) => lines.lock().pop_front(),
            Self::Closed => None,
        }
    }
}

pub type SharedPrintHandler = Arc<PrintHandler>;
pub type SharedInputHandler = Arc<InputHandler>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Stdout)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::buffer())
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Silent)
}
