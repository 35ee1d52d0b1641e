//! Integration tests for serialized transitions.

mod common;

use std::sync::Arc;

use cellobject::model::{EditOperation, IndexPath, RenderState};
use cellobject::view::{SchedulerState, TransitionInfo, UpdatePolicy, UpdateScheduler};
use cellobject::{RunLoop, Size};
use common::{RecordingWidget, WidgetEvent, init_tracing, model, rows};
use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

fn setup() -> (Arc<RecordingWidget>, RunLoop, UpdateScheduler) {
    init_tracing();
    let widget = RecordingWidget::new(Size::new(320.0, 480.0));
    let run_loop = RunLoop::new();
    let scheduler = UpdateScheduler::new(widget.clone(), run_loop.clone());
    (widget, run_loop, scheduler)
}

fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce() + Send>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let make = move |name: &'static str| -> Box<dyn FnOnce() + Send> {
        let sink = sink.clone();
        Box::new(move || sink.lock().push(name))
    };
    (log, make)
}

#[test]
fn overlapping_requests_are_shown_in_order() {
    let (widget, _run_loop, scheduler) = setup();
    let (log, cb) = recorder();
    let [a, b, c, d] = rows();
    let m1 = model(&[&[&a, &b]]);
    let m2 = model(&[&[&b, &c]]);
    let m3 = model(&[&[&c, &d, &a]]);

    scheduler.request_update(m1.clone(), true, cb("cb1"));
    scheduler.request_update(m2.clone(), true, cb("cb2"));
    scheduler.request_update(m3.clone(), true, cb("cb3"));
    assert_eq!(scheduler.pending_count(), 2);
    assert_eq!(widget.held_completions(), 1);

    assert_eq!(widget.complete_all(), 3);
    assert_eq!(*log.lock(), vec!["cb1", "cb2", "cb3"]);
    assert!(Arc::ptr_eq(&scheduler.displayed_model(), &m3));
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    // Every batch was computed against the model on screen when it started.
    let batches = widget.batches();
    assert_eq!(batches.len(), 3);
    let mut screen = RenderState::default();
    for (batch, target) in batches.iter().zip([&m1, &m2, &m3]) {
        screen = screen.apply(batch, target).unwrap();
        assert_eq!(screen, RenderState::from_model(target));
    }
}

#[test]
fn displayed_model_changes_when_transition_starts() {
    let (widget, _run_loop, scheduler) = setup();
    let [a, b] = rows();
    let m1 = model(&[&[&a]]);
    let m2 = model(&[&[&a, &b]]);

    scheduler.set_model(m1.clone(), true);
    scheduler.set_model(m2.clone(), true);
    assert!(Arc::ptr_eq(&scheduler.displayed_model(), &m1));
    assert!(Arc::ptr_eq(&scheduler.latest_model(), &m2));

    widget.complete_next();
    assert!(Arc::ptr_eq(&scheduler.displayed_model(), &m2));
    assert!(scheduler.is_transitioning());
}

#[test]
fn non_animated_update_reloads_and_defers_completion() {
    let (widget, run_loop, scheduler) = setup();
    let (log, cb) = recorder();
    let [a, b] = rows();

    scheduler.request_update(model(&[&[&a]]), false, cb("reloaded"));
    scheduler.request_update(model(&[&[&a, &b]]), true, cb("animated"));

    assert_eq!(widget.events(), vec![WidgetEvent::ReloadAll]);
    assert!(log.lock().is_empty());
    assert_eq!(scheduler.pending_count(), 1);

    // The deferred completion runs on the next tick and starts the queued
    // animated request.
    assert_eq!(run_loop.run_pending(), 1);
    assert_eq!(*log.lock(), vec!["reloaded"]);
    assert_eq!(widget.batches().len(), 1);
    assert_eq!(
        widget.batches()[0].operations(),
        vec![EditOperation::InsertItem(IndexPath::new(0, 1))]
    );

    widget.complete_next();
    assert_eq!(*log.lock(), vec!["reloaded", "animated"]);
    assert!(!run_loop.has_pending());
}

#[test]
fn callback_requests_queue_behind_pending_ones() {
    let (widget, _run_loop, scheduler) = setup();
    let log = Arc::new(Mutex::new(Vec::new()));
    let [a, b, c] = rows();
    let m1 = model(&[&[&a]]);
    let m2 = model(&[&[&b]]);
    let m3 = model(&[&[&c]]);

    let inner = scheduler.clone();
    let l = log.clone();
    let m3_for_callback = m3.clone();
    scheduler.request_update(m1, true, move || {
        l.lock().push("cb1");
        let l = l.clone();
        inner.request_update(m3_for_callback, true, move || l.lock().push("cb3"));
    });
    let l = log.clone();
    scheduler.request_update(m2.clone(), true, move || l.lock().push("cb2"));

    widget.complete_next();
    assert!(Arc::ptr_eq(&scheduler.displayed_model(), &m2));

    widget.complete_all();
    assert_eq!(*log.lock(), vec!["cb1", "cb2", "cb3"]);
    assert!(Arc::ptr_eq(&scheduler.displayed_model(), &m3));
}

#[test]
fn coalescing_skips_intermediate_models() {
    let (widget, _run_loop, scheduler) = setup();
    let scheduler = scheduler.with_policy(UpdatePolicy::CoalesceLatest);
    let (log, cb) = recorder();
    let [a, b, c, d] = rows();
    let m4 = model(&[&[&d]]);

    scheduler.request_update(model(&[&[&a]]), true, cb("cb1"));
    scheduler.request_update(model(&[&[&b]]), true, cb("cb2"));
    scheduler.request_update(model(&[&[&c]]), true, cb("cb3"));
    scheduler.request_update(m4.clone(), true, cb("cb4"));
    assert_eq!(scheduler.pending_count(), 1);

    assert_eq!(widget.complete_all(), 2);
    assert_eq!(*log.lock(), vec!["cb1", "cb2", "cb3", "cb4"]);
    assert!(Arc::ptr_eq(&scheduler.displayed_model(), &m4));
    assert_eq!(widget.batches().len(), 2);
}

#[test]
fn policy_change_applies_to_later_requests() {
    let (widget, _run_loop, scheduler) = setup();
    let [a, b, c] = rows();

    scheduler.set_model(model(&[&[&a]]), true);
    scheduler.set_model(model(&[&[&b]]), true);
    scheduler.set_policy(UpdatePolicy::CoalesceLatest);
    assert_eq!(scheduler.policy(), UpdatePolicy::CoalesceLatest);
    scheduler.set_model(model(&[&[&c]]), true);

    assert_eq!(scheduler.pending_count(), 1);
    assert_eq!(widget.complete_all(), 2);
}

#[test]
fn abandoned_transition_never_calls_back() {
    let (widget, _run_loop, scheduler) = setup();
    let (log, cb) = recorder();
    let [a, b] = rows();

    scheduler.request_update(model(&[&[&a]]), true, cb("first"));
    scheduler.request_update(model(&[&[&b]]), true, cb("second"));
    widget.drop_completions();

    assert!(scheduler.is_transitioning());
    assert_eq!(scheduler.pending_count(), 1);
    assert!(log.lock().is_empty());
}

#[test]
fn transition_signals_fire_in_order() {
    let (widget, _run_loop, scheduler) = setup();
    let events = Arc::new(Mutex::new(Vec::new()));
    let [a, b] = rows();

    let e = events.clone();
    let _started = scheduler
        .transition_started()
        .connect_scoped(move |info: &TransitionInfo| e.lock().push(("started", info.generation, info.pending)));
    let e = events.clone();
    let _finished = scheduler
        .transition_finished()
        .connect_scoped(move |info: &TransitionInfo| e.lock().push(("finished", info.generation, info.pending)));

    scheduler.set_model(model(&[&[&a]]), true);
    scheduler.set_model(model(&[&[&a, &b]]), true);
    widget.complete_all();

    assert_eq!(
        *events.lock(),
        vec![
            ("started", 1, 0),
            ("finished", 1, 0),
            ("started", 2, 0),
            ("finished", 2, 0),
        ]
    );
}

/// Records perf span lifetimes and which span scheduler events fall in.
#[derive(Clone, Default)]
struct SpanLog(Arc<Mutex<Vec<String>>>);

impl SpanLog {
    fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// The `operation` field of a perf span.
struct Operation(String);

impl Visit for Operation {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "operation" {
            self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

impl<S> Layer<S> for SpanLog
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if attrs.metadata().target() != "cellobject::perf" {
            return;
        }
        let mut operation = Operation(String::new());
        attrs.record(&mut operation);
        self.0.lock().push(format!("open {}", operation.0));
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(operation);
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        if event.metadata().target() != "cellobject::scheduler" {
            return;
        }
        let within = ctx
            .event_span(event)
            .and_then(|span| span.extensions().get::<Operation>().map(|op| op.0.clone()))
            .unwrap_or_default();
        self.0.lock().push(format!("event in {within}"));
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(&id)
            && let Some(operation) = span.extensions().get::<Operation>()
        {
            self.0.lock().push(format!("close {}", operation.0));
        }
    }
}

#[test]
fn transition_span_lasts_until_completion() {
    let spans = SpanLog::default();
    let subscriber = tracing_subscriber::registry().with(spans.clone());

    tracing::subscriber::with_default(subscriber, || {
        let widget = RecordingWidget::new(Size::new(320.0, 480.0));
        let scheduler = UpdateScheduler::new(widget.clone(), RunLoop::new());
        let [a] = rows();

        scheduler.set_model(model(&[&[&a]]), true);
        let during = spans.entries();
        assert!(during.contains(&"open cellobject::transition".to_string()), "{during:?}");
        assert!(!during.contains(&"close cellobject::transition".to_string()), "{during:?}");

        assert!(widget.complete_next());
        let after = spans.entries();
        assert_eq!(
            &after[after.len() - 2..],
            &[
                "event in cellobject::transition".to_string(),
                "close cellobject::transition".to_string(),
            ],
            "{after:?}"
        );
    });
}
