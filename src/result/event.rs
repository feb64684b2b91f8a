//! Output events and the sources that deliver them.

use std::fmt;

use tokio::sync::mpsc;

use crate::error::ShellResultError;
use crate::Result;

/// Output stream a line was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => f.write_str("stdout"),
            Stream::Stderr => f.write_str("stderr"),
        }
    }
}

/// Payload of one output line, either already decoded or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineData {
    /// Decoded text.
    Text(String),
    /// Raw bytes, expected to be UTF-8.
    Bytes(Vec<u8>),
}

impl LineData {
    /// Decode into text.
    ///
    /// `stream` is only used to label the error.
    pub fn decode(self, stream: Stream) -> Result<String> {
        match self {
            LineData::Text(text) => Ok(text),
            LineData::Bytes(bytes) => String::from_utf8(bytes)
                .map_err(|e| ShellResultError::Decoding {
                    stream,
                    source: e.utf8_error(),
                }),
        }
    }
}

impl From<String> for LineData {
    fn from(text: String) -> Self {
        LineData::Text(text)
    }
}

impl From<&str> for LineData {
    fn from(text: &str) -> Self {
        LineData::Text(text.to_owned())
    }
}

impl From<Vec<u8>> for LineData {
    fn from(bytes: Vec<u8>) -> Self {
        LineData::Bytes(bytes)
    }
}

impl From<&[u8]> for LineData {
    fn from(bytes: &[u8]) -> Self {
        LineData::Bytes(bytes.to_vec())
    }
}

/// One unit delivered by an [`EventSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A line written to `stream`.
    Line { stream: Stream, data: LineData },
    /// No more lines will arrive on this stream.
    End(Stream),
    /// The command finished with this exit code.
    Exit(i32),
}

impl Event {
    /// Create a stdout line event.
    pub fn stdout(data: impl Into<LineData>) -> Self {
        Event::Line {
            stream: Stream::Stdout,
            data: data.into(),
        }
    }

    /// Create a stderr line event.
    pub fn stderr(data: impl Into<LineData>) -> Self {
        Event::Line {
            stream: Stream::Stderr,
            data: data.into(),
        }
    }
}

/// Ordered, blocking source of output events.
///
/// `next_event` blocks until an event is available. `None` means the
/// source is disconnected and will never produce anything again.
pub trait EventSource: Send {
    /// Pull the next event.
    fn next_event(&mut self) -> Option<Event>;
}

/// Blocks the current thread; must not be called from an async worker.
impl EventSource for mpsc::Receiver<Event> {
    fn next_event(&mut self) -> Option<Event> {
        self.blocking_recv()
    }
}

/// Blocks the current thread; must not be called from an async worker.
impl EventSource for mpsc::UnboundedReceiver<Event> {
    fn next_event(&mut self) -> Option<Event> {
        self.blocking_recv()
    }
}

impl EventSource for std::sync::mpsc::Receiver<Event> {
    fn next_event(&mut self) -> Option<Event> {
        self.recv().ok()
    }
}

/// Pre-recorded events, mostly useful for replaying captured output.
impl EventSource for std::vec::IntoIter<Event> {
    fn next_event(&mut self) -> Option<Event> {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_display() {
        assert_eq!(Stream::Stdout.to_string(), "stdout");
        assert_eq!(Stream::Stderr.to_string(), "stderr");
    }

    #[test]
    fn test_decode_text() {
        let data = LineData::from("hello");
        assert_eq!(data.decode(Stream::Stdout).unwrap(), "hello");
    }

    #[test]
    fn test_decode_bytes() {
        let data = LineData::from("héllo".as_bytes());
        assert_eq!(data.decode(Stream::Stdout).unwrap(), "héllo");
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let data = LineData::from(vec![b'o', b'k', 0xff]);
        let err = data.decode(Stream::Stderr).unwrap_err();
        assert!(matches!(
            err,
            ShellResultError::Decoding {
                stream: Stream::Stderr,
                ..
            }
        ));
    }

    #[test]
    fn test_event_constructors() {
        assert_eq!(
            Event::stdout("a"),
            Event::Line {
                stream: Stream::Stdout,
                data: LineData::Text("a".into()),
            }
        );
        assert_eq!(
            Event::stderr(b"x".to_vec()),
            Event::Line {
                stream: Stream::Stderr,
                data: LineData::Bytes(b"x".to_vec()),
            }
        );
    }

    #[test]
    fn test_unbounded_receiver_source() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(Event::stdout("a")).unwrap();
        tx.send(Event::Exit(0)).unwrap();
        drop(tx);

        assert_eq!(rx.next_event(), Some(Event::stdout("a")));
        assert_eq!(rx.next_event(), Some(Event::Exit(0)));
        assert_eq!(rx.next_event(), None);
    }

    #[test]
    fn test_bounded_receiver_source() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.try_send(Event::End(Stream::Stdout)).unwrap();
        drop(tx);

        assert_eq!(rx.next_event(), Some(Event::End(Stream::Stdout)));
        assert_eq!(rx.next_event(), None);
    }

    #[test]
    fn test_std_receiver_source() {
        let (tx, mut rx) = std::sync::mpsc::channel();
        tx.send(Event::stderr("boom")).unwrap();
        drop(tx);

        assert_eq!(rx.next_event(), Some(Event::stderr("boom")));
        assert_eq!(rx.next_event(), None);
    }
}
