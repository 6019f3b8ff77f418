// Copyright (c) 2019-present Dmitry Stepanov and Fyrox Engine contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//! Process-wide logger of the sculpting tools. Every record carries the module it came from and
//! the time since the logger was first used. Records are printed to stdout, optionally duplicated
//! into a file and sent to subscribed channels. Log macros fill the source in with `module_path!()`.

use parking_lot::Mutex;
use std::{
    fmt::{self, Debug, Display, Formatter},
    fs::File,
    io::{self, Write},
    path::Path,
    sync::{mpsc::Sender, LazyLock},
    time::{Duration, Instant},
};

/// Source of records written through the plain [`Log::info`], [`Log::warn`] and [`Log::err`].
pub const DEFAULT_SOURCE: &str = "terrain_sculpt";

/// Severity of a record.
#[derive(Debug, Default, Copy, Clone, PartialOrd, PartialEq, Eq, Ord, Hash)]
pub enum MessageKind {
    #[default]
    Information,
    Warning,
    Error,
}

impl MessageKind {
    /// Fixed-width label used in formatted lines.
    pub fn label(self) -> &'static str {
        match self {
            MessageKind::Information => "INFO ",
            MessageKind::Warning => "WARN ",
            MessageKind::Error => "ERROR",
        }
    }
}

/// A single record, as it is handed to listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMessage {
    pub kind: MessageKind,
    /// Module path of the code that wrote the record.
    pub source: &'static str,
    pub content: String,
    /// Time since the logger was first used.
    pub time: Duration,
}

impl Display for LogMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>9.3}s] {} {}: {}",
            self.time.as_secs_f32(),
            self.kind.label(),
            self.source,
            self.content
        )
    }
}

struct Sink {
    file: Option<File>,
    verbosity: MessageKind,
    listeners: Vec<Sender<LogMessage>>,
    start: Instant,
}

impl Sink {
    fn dispatch(&mut self, kind: MessageKind, source: &'static str, content: String) {
        if kind < self.verbosity {
            return;
        }

        let message = LogMessage {
            kind,
            source,
            content,
            time: self.start.elapsed(),
        };
        let line = format!("{message}\n");

        let _ = io::stdout().write_all(line.as_bytes());
        if let Some(file) = self.file.as_mut() {
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }

        // Disconnected listeners are dropped.
        self.listeners
            .retain(|listener| listener.send(message.clone()).is_ok());
    }
}

static SINK: LazyLock<Mutex<Sink>> = LazyLock::new(|| {
    Mutex::new(Sink {
        file: None,
        verbosity: MessageKind::Information,
        listeners: Vec::new(),
        start: Instant::now(),
    })
});

/// See module docs.
pub struct Log;

impl Log {
    /// Duplicates every record into a newly created file at `path`. Returns an error if the file
    /// cannot be created, the logger then keeps writing to stdout only.
    pub fn set_file_name<P: AsRef<Path>>(path: P) -> io::Result<()> {
        let file = File::create(path);
        let mut sink = SINK.lock();
        match file {
            Ok(file) => {
                sink.file = Some(file);
                Ok(())
            }
            Err(e) => {
                sink.file = None;
                Err(e)
            }
        }
    }

    /// Writes a record on behalf of `source`.
    pub fn write<S: AsRef<str>>(kind: MessageKind, source: &'static str, msg: S) {
        SINK.lock()
            .dispatch(kind, source, msg.as_ref().to_owned());
    }

    pub fn info<S: AsRef<str>>(msg: S) {
        Self::write(MessageKind::Information, DEFAULT_SOURCE, msg)
    }

    pub fn warn<S: AsRef<str>>(msg: S) {
        Self::write(MessageKind::Warning, DEFAULT_SOURCE, msg)
    }

    pub fn err<S: AsRef<str>>(msg: S) {
        Self::write(MessageKind::Error, DEFAULT_SOURCE, msg)
    }

    /// Records of a lower kind are dropped before they reach any output.
    pub fn set_verbosity(kind: MessageKind) {
        SINK.lock().verbosity = kind;
    }

    pub fn verbosity() -> MessageKind {
        SINK.lock().verbosity
    }

    /// Subscribes a channel to every record that passes the verbosity filter.
    pub fn add_listener(listener: Sender<LogMessage>) {
        SINK.lock().listeners.push(listener)
    }

    /// Returns the success value or logs the error and returns `None`. Use it where a failure
    /// can be tolerated but should not go unnoticed.
    pub fn verify<T, E: Debug>(result: Result<T, E>) -> Option<T> {
        Self::verify_message(result, "Operation failed")
    }

    /// Same as [`Self::verify`], with `msg` in front of the error.
    pub fn verify_message<S, T, E>(result: Result<T, E>, msg: S) -> Option<T>
    where
        E: Debug,
        S: Display,
    {
        result
            .map_err(|e| Self::err(format!("{msg}. Reason: {e:?}")))
            .ok()
    }
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log::Log::write(
            $crate::log::MessageKind::Information,
            module_path!(),
            format!($($arg)*),
        )
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log::Log::write(
            $crate::log::MessageKind::Warning,
            module_path!(),
            format!($($arg)*),
        )
    };
}

#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::log::Log::write(
            $crate::log::MessageKind::Error,
            module_path!(),
            format!($($arg)*),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn line_carries_time_kind_and_source() {
        let message = LogMessage {
            kind: MessageKind::Warning,
            source: "sculpt_core::brush",
            content: "stamp index 9 is out of range".to_owned(),
            time: Duration::from_millis(1250),
        };
        assert_eq!(
            message.to_string(),
            "[    1.250s] WARN  sculpt_core::brush: stamp index 9 is out of range"
        );
    }

    #[test]
    fn listeners_receive_records_with_their_source() {
        let (sender, receiver) = channel();
        Log::add_listener(sender);

        crate::err!("brush stamp {} is missing", 3);
        Log::warn("plain warning");
        assert_eq!(Log::verify(Ok::<_, ()>(42)), Some(42));
        assert_eq!(
            Log::verify_message(Err::<u32, _>("bad file"), "Unable to load stamp"),
            None
        );

        // Other tests may log concurrently, so look for our records among everything received.
        let messages = receiver.try_iter().collect::<Vec<_>>();
        assert!(messages.iter().any(|m| m.kind == MessageKind::Error
            && m.source == "sculpt_core::log::tests"
            && m.content == "brush stamp 3 is missing"));
        assert!(messages
            .iter()
            .any(|m| m.source == DEFAULT_SOURCE && m.content == "plain warning"));
        assert!(messages
            .iter()
            .any(|m| m.content.starts_with("Unable to load stamp. Reason:")));
    }
}
