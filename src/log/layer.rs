//! Custom tracing Layer that renders events as line-delimited JSON.
//!
//! This is the non-interactive renderer installed by [`crate::log::init`]
//! when stdout is not a terminal. Every event becomes one [`LogEntry`]
//! written as a single JSON line.

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::entry::LogEntry;

/// Ambient fields recorded on a span, stored in its extensions so they
/// can be merged into every event emitted inside that span.
struct SpanFields(Map<String, Value>);

/// A tracing Layer that writes one JSON object per event to a writer.
///
/// Generic over a [`MakeWriter`] so production output goes to stdout
/// while tests can capture into a buffer.
pub struct JsonLayer<W = fn() -> std::io::Stdout> {
    make_writer: W,
}

impl JsonLayer {
    /// Create a layer writing to standard output.
    pub fn stdout() -> Self {
        Self {
            make_writer: std::io::stdout,
        }
    }
}

impl<W> JsonLayer<W> {
    /// Create a layer writing to the given writer factory.
    pub fn with_writer(make_writer: W) -> Self {
        Self { make_writer }
    }
}

impl<S, W> Layer<S> for JsonLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'a> MakeWriter<'a> + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };

        let mut visitor = FieldVisitor::new();
        attrs.record(&mut visitor);
        if !visitor.fields.is_empty() {
            span.extensions_mut().insert(SpanFields(visitor.fields));
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };

        let mut visitor = FieldVisitor::new();
        values.record(&mut visitor);
        if visitor.fields.is_empty() {
            return;
        }

        let mut extensions = span.extensions_mut();
        if let Some(existing) = extensions.get_mut::<SpanFields>() {
            existing.0.extend(visitor.fields);
            return;
        }
        extensions.insert(SpanFields(visitor.fields));
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        // Ambient span fields first, root inward, so inner bindings and
        // the event's own fields win on key collisions.
        let mut fields = Map::new();
        let mut scope_names = Vec::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                scope_names.push(span.name().to_string());
                if let Some(ambient) = span.extensions().get::<SpanFields>() {
                    for (key, value) in &ambient.0 {
                        fields.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        fields.extend(visitor.fields);

        let level = metadata.level().as_str().to_lowercase();
        let logger = visitor
            .logger
            .unwrap_or_else(|| metadata.target().to_string());
        let message = visitor.message.unwrap_or_default();

        let mut entry = LogEntry::new(level, logger, message)
            .with_callsite(metadata.file(), metadata.line())
            .with_fields(fields);
        if !scope_names.is_empty() {
            entry = entry.with_span(scope_names.join(" > "));
        }

        // Never panic inside the logging path; drop the record instead.
        if let Ok(line) = entry.to_json_line() {
            let mut writer = self.make_writer.make_writer();
            let _ = writeln!(writer, "{}", line);
        }
    }
}

/// Visitor that extracts fields from tracing events and spans.
///
/// Three field names are special: `message` becomes the event text,
/// `logger` names the emitting handle, and `fields` carries a
/// JSON-encoded object of caller fields which is expanded back into
/// top-level keys.
struct FieldVisitor {
    message: Option<String>,
    logger: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            message: None,
            logger: None,
            fields: Map::new(),
        }
    }

    fn record_text(&mut self, field: &Field, text: String) {
        match field.name() {
            "message" => self.message = Some(text),
            "logger" => self.logger = Some(text),
            "fields" => match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(expanded) => self.fields.extend(expanded),
                Err(_) => {
                    self.fields.insert("fields".to_string(), Value::String(text));
                }
            },
            name => {
                self.fields.insert(name.to_string(), Value::String(text));
            }
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let mut buf = String::new();
        let _ = write!(&mut buf, "{:?}", value);
        self.record_text(field, buf);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), Value::Bool(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(number) = serde_json::Number::from_f64(value) {
            self.fields
                .insert(field.name().to_string(), Value::Number(number));
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        let mut chain = vec![Value::String(value.to_string())];
        let mut source = value.source();
        while let Some(cause) = source {
            chain.push(Value::String(cause.to_string()));
            source = cause.source();
        }
        self.fields
            .insert(field.name().to_string(), Value::Array(chain));
    }
}
