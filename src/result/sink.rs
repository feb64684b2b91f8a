//! Log sinks receiving each line as it is drained.

use tracing::{error, info};

/// Receives the command and every drained line.
///
/// Called once per line, in drain order, and never for replayed lines.
pub trait LogSink: Send + Sync {
    /// The command text, logged when a result is created.
    fn command(&self, _command: &str) {}

    /// A line written to stdout.
    fn stdout(&self, line: &str);

    /// A line written to stderr.
    fn stderr(&self, line: &str);
}

/// Default sink forwarding lines to `tracing`.
///
/// Commands go to the `shell_result::stdin` target, stdout lines to
/// `shell_result::stdout` at info level and stderr lines to
/// `shell_result::stderr` at error level, so they can be filtered
/// independently with `RUST_LOG`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn command(&self, command: &str) {
        info!(target: "shell_result::stdin", "{}", command);
    }

    fn stdout(&self, line: &str) {
        info!(target: "shell_result::stdout", "{}", line);
    }

    fn stderr(&self, line: &str) {
        error!(target: "shell_result::stderr", "{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    type Captured = Arc<Mutex<Vec<(Level, String, String)>>>;

    /// Layer recording level, target and message of every event.
    struct CaptureLayer(Captured);

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{:?}", value);
            }
        }
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            let meta = event.metadata();
            self.0
                .lock()
                .unwrap()
                .push((*meta.level(), meta.target().to_string(), visitor.0));
        }
    }

    #[test]
    fn test_tracing_sink_levels_and_targets() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(CaptureLayer(captured.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let sink = TracingSink;
            sink.command("echo Foo");
            sink.stdout("Foo");
            sink.stderr("Bar");
        });

        assert_eq!(
            *captured.lock().unwrap(),
            vec![
                (Level::INFO, "shell_result::stdin".to_string(), "echo Foo".to_string()),
                (Level::INFO, "shell_result::stdout".to_string(), "Foo".to_string()),
                (Level::ERROR, "shell_result::stderr".to_string(), "Bar".to_string()),
            ]
        );
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        let _ = crate::logging::try_init();

        let sink = TracingSink;
        sink.command("echo Foo");
        sink.stdout("Foo");
        sink.stderr("Bar");
    }

    #[test]
    fn test_sink_is_object_safe() {
        let sink: std::sync::Arc<dyn LogSink> = std::sync::Arc::new(TracingSink);
        sink.stdout("line");
    }
}
