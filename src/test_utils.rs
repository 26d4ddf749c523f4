//! Shared helpers for the crate's tests.

use std::sync::{Arc, Mutex, Once};

use tracing::Level;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

static INIT: Once = Once::new();

/// Loads the test environment once per process.
pub fn init_test_environment() {
    INIT.call_once(|| {
        // Load .env_test, falling back to .env for local runs.
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

#[derive(Debug, Clone)]
pub struct CapturedLog {
    pub level: Level,
    pub message: String,
}

/// A tracing layer that records every event's level and message, so tests
/// can assert on what the provider reported.
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedLog>>>,
}

impl LogCapture {
    pub fn events(&self) -> Vec<CapturedLog> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.level == level)
            .map(|event| event.message.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages_at(Level::WARN)
    }
}

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.events.lock().unwrap().push(CapturedLog {
                level: *event.metadata().level(),
                message,
            });
        }
    }
}

/// Runs `f` with a capture subscriber installed as the thread default,
/// returning the closure's result and everything it logged.
pub fn with_captured_logs<R>(f: impl FnOnce() -> R) -> (R, LogCapture) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture)
}
