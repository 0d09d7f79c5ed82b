//! `tracing` → browser console
//!
//! Minimal subscriber layer: formats each event as
//! `LEVEL target: message key=value ...` and routes it to the matching
//! `console.*` method so browser devtools can filter by level.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use wasm_bindgen::JsValue;

pub struct ConsoleLayer {
    max_level: Level,
}

impl ConsoleLayer {
    pub fn new(max_level: Level) -> Self {
        Self { max_level }
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// One console line for an event
fn format_line(level: &Level, target: &str, visitor: &LineVisitor) -> String {
    format!("{level} {target}: {}{}", visitor.message, visitor.fields)
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        *metadata.level() <= self.max_level
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();
        let line = format_line(metadata.level(), metadata.target(), &visitor);

        let value = JsValue::from_str(&line);
        match *metadata.level() {
            Level::ERROR => web_sys::console::error_1(&value),
            Level::WARN => web_sys::console::warn_1(&value),
            Level::INFO => web_sys::console::log_1(&value),
            _ => web_sys::console::debug_1(&value),
        }
    }
}

/// Install the console layer as the global subscriber. Safe to call
/// more than once; later calls are ignored.
pub fn init_logging(max_level: Level) {
    let subscriber = tracing_subscriber::registry().with(ConsoleLayer::new(max_level));
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        web_sys::console::debug_1(&JsValue::from_str("tracing subscriber already installed"));
    }
}
