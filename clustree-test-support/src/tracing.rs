//! Recording layer utilities for capturing spans and events in tests.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    span::{Attributes, Id, Record},
};
use tracing_subscriber::{Layer, layer::Context, prelude::*, registry::LookupSpan};

/// Layer that keeps every closed span and emitted event so tests can assert
/// on instrumentation.
///
/// # Examples
/// ```
/// use clustree_test_support::tracing::RecordingLayer;
///
/// let (layer, value) = RecordingLayer::capture(|| {
///     tracing::info_span!("demo", rows = 3).in_scope(|| tracing::info!("inside"));
///     7
/// });
/// assert_eq!(value, 7);
/// assert_eq!(layer.span("demo").as_ref().and_then(|span| span.field("rows")), Some("3"));
/// assert!(layer.has_event_message("inside"));
/// ```
#[derive(Clone, Default)]
pub struct RecordingLayer {
    log: Arc<Mutex<Recording>>,
}

#[derive(Default)]
struct Recording {
    spans: Vec<SpanRecord>,
    events: Vec<EventRecord>,
}

impl RecordingLayer {
    /// Runs `body` with a fresh layer installed as the thread's default
    /// subscriber and returns the layer with the value.
    pub fn capture<T>(body: impl FnOnce() -> T) -> (Self, T) {
        let layer = Self::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        let value = tracing::subscriber::with_default(subscriber, body);
        (layer, value)
    }

    /// Closed spans in completion order.
    #[must_use]
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.lock().spans.clone()
    }

    /// Emitted events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<EventRecord> {
        self.lock().events.clone()
    }

    /// The first closed span called `name`.
    #[must_use]
    pub fn span(&self, name: &str) -> Option<SpanRecord> {
        self.lock()
            .spans
            .iter()
            .find(|span| span.name == name)
            .cloned()
    }

    /// Names of the closed spans in completion order.
    #[must_use]
    pub fn span_names(&self) -> Vec<String> {
        self.lock()
            .spans
            .iter()
            .map(|span| span.name.clone())
            .collect()
    }

    /// Whether any event carried `message`.
    #[must_use]
    pub fn has_event_message(&self, message: &str) -> bool {
        self.lock()
            .events
            .iter()
            .any(|event| event.field("message") == Some(message))
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A closed span with its name and recorded fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanRecord {
    /// Span name from the callsite metadata.
    pub name: String,
    /// Fields recorded when the span opened or later.
    pub fields: HashMap<String, String>,
}

impl SpanRecord {
    /// Value of field `name` as text.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// An emitted event with its level, target and fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Event level.
    pub level: Level,
    /// Event target, usually the emitting module path.
    pub target: String,
    /// Event fields, including `message`.
    pub fields: HashMap<String, String>,
}

impl EventRecord {
    /// Value of field `name` as text.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

struct OpenSpan(SpanRecord);

impl<S> Layer<S> for RecordingLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut record = SpanRecord {
            name: attrs.metadata().name().to_owned(),
            fields: HashMap::new(),
        };
        attrs.record(&mut FieldText(&mut record.fields));
        span.extensions_mut().insert(OpenSpan(record));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        if let Some(OpenSpan(record)) = span.extensions_mut().get_mut::<OpenSpan>() {
            values.record(&mut FieldText(&mut record.fields));
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        if let Some(OpenSpan(record)) = span.extensions_mut().remove::<OpenSpan>() {
            self.lock().spans.push(record);
        }
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut FieldText(&mut fields));
        let metadata = event.metadata();
        self.lock().events.push(EventRecord {
            level: *metadata.level(),
            target: metadata.target().to_owned(),
            fields,
        });
    }
}

/// Stores every field as text; numbers and booleans arrive through
/// `record_debug`.
struct FieldText<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldText<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.0.insert(field.name().to_owned(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }
}
