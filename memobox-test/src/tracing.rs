//! Span capture for asserting on interceptor decisions.
//!
//! Only spans whose name starts with `memobox.` are recorded. Fields set
//! later with `Span::record` are merged into the captured span, so the final
//! `outcome` of every call and return event can be inspected.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::span::{Attributes, Id, Record};
use tracing::{Dispatch, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

const PREFIX: &str = "memobox.";

/// Captured span information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedSpan {
    /// Unique span ID
    pub id: u64,
    /// Span name (e.g. `memobox.call`)
    pub name: String,
    /// Captured field values as strings
    pub fields: Vec<(String, String)>,
}

impl CapturedSpan {
    /// Value of one field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

struct SpanCaptureLayer {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
}

struct FieldVisitor {
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.fields.push((field.name().to_string(), format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.fields.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> Layer<S> for SpanCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, _ctx: Context<'_, S>) {
        let metadata = attrs.metadata();
        if !metadata.name().starts_with(PREFIX) {
            return;
        }

        let mut visitor = FieldVisitor { fields: Vec::new() };
        attrs.record(&mut visitor);
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CapturedSpan {
                id: id.into_u64(),
                name: metadata.name().to_string(),
                fields: visitor.fields,
            });
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span_ref) = ctx.span(id) else {
            return;
        };
        if !span_ref.metadata().name().starts_with(PREFIX) {
            return;
        }

        let mut visitor = FieldVisitor { fields: Vec::new() };
        values.record(&mut visitor);

        let span_id = id.into_u64();
        let mut spans = self.spans.lock().unwrap_or_else(PoisonError::into_inner);
        // Ids are reused once a span closes; the latest capture is the live one.
        if let Some(captured) = spans.iter_mut().rev().find(|span| span.id == span_id) {
            for (key, value) in visitor.fields {
                match captured.fields.iter_mut().find(|(k, _)| *k == key) {
                    Some(existing) => existing.1 = value,
                    None => captured.fields.push((key, value)),
                }
            }
        }
    }
}

/// Collector for captured spans.
#[derive(Clone)]
pub struct SpanCollector {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    dispatch: Dispatch,
}

impl SpanCollector {
    /// A collector with its own subscriber.
    pub fn new() -> Self {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let subscriber = Registry::default().with(SpanCaptureLayer {
            spans: spans.clone(),
        });
        Self {
            spans,
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// The subscriber to install while running code under test.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// All captured spans in creation order.
    pub fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// `outcome` field of every span called `name`, in order.
    pub fn outcomes(&self, name: &str) -> Vec<String> {
        self.spans()
            .into_iter()
            .filter(|span| span.name == name)
            .map(|span| span.field("outcome").unwrap_or_default().to_string())
            .collect()
    }

    /// Forgets everything captured so far.
    pub fn clear(&self) {
        self.spans.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Default for SpanCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `f` with span capture enabled on this thread.
pub fn with_span_capture<F, R>(f: F) -> (R, SpanCollector)
where
    F: FnOnce() -> R,
{
    let collector = SpanCollector::new();
    let result = tracing::dispatcher::with_default(collector.dispatch(), f);
    (result, collector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_prefixed_spans_and_late_fields() {
        let ((), collector) = with_span_capture(|| {
            let span = tracing::info_span!("memobox.call", function = "f", outcome = tracing::field::Empty);
            span.record("outcome", "hit");
            let _ignored = tracing::info_span!("other.span");
        });

        let spans = collector.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].field("function"), Some("f"));
        assert_eq!(collector.outcomes("memobox.call"), ["hit"]);
    }
}
