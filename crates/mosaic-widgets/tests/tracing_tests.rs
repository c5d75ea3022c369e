#![forbid(unsafe_code)]

//! Log-capture tests for widget transitions.
//!
//!   cargo test -p mosaic-widgets --features tracing --test tracing_tests

#![cfg(feature = "tracing")]

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mosaic_core::testing::{FakeScope, FocusDocument};
use mosaic_core::{FocusScope, Scheduler};
use mosaic_shortcuts::{Platform, ShortcutConfig, ShortcutRegistry};
use mosaic_widgets::{
    CommandPalette, Overlay, OverlayConfig, PaletteConfig, ToastConfig, ToastManager,
    ToastOptions,
};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

// ============================================================================
// Test Infrastructure
// ============================================================================

/// One captured event: level, message and the remaining fields.
#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    message: String,
    fields: HashMap<String, String>,
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<CapturedEvent>>>);

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let value = format!("{value:?}");
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.insert(field.name().to_owned(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_owned(), value.to_string());
    }
}

impl<S: Subscriber> Layer<S> for Captured {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        if let Ok(mut log) = self.0.lock() {
            log.push(CapturedEvent {
                level: *event.metadata().level(),
                message: visitor.message,
                fields: visitor.fields,
            });
        }
    }
}

fn capture(f: impl FnOnce()) -> Vec<CapturedEvent> {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::registry().with(captured.clone());
    tracing::subscriber::with_default(subscriber, f);
    captured.0.lock().map(|l| l.clone()).unwrap_or_default()
}

fn messages(log: &[CapturedEvent]) -> Vec<&str> {
    log.iter().map(|e| e.message.as_str()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn overlay_lifecycle_is_logged_in_order() {
    let log = capture(|| {
        let sched = Scheduler::new();
        let doc = FocusDocument::new();
        let scope = Rc::new(FakeScope::new(&doc, "panel", &["a"]));
        let overlay = Overlay::new(&sched, scope as Rc<dyn FocusScope>, OverlayConfig::default());
        overlay.open();
        sched.run_pending();
        overlay.close();
    });
    let lifecycle: Vec<&str> = messages(&log)
        .into_iter()
        .filter(|m| m.starts_with("overlay"))
        .collect();
    assert_eq!(lifecycle, vec!["overlay opening", "overlay open", "overlay closed"]);
    assert!(log.iter().all(|e| e.level >= Level::DEBUG));
}

#[test]
fn toast_timers_log_with_ids() {
    let log = capture(|| {
        let sched = Scheduler::new();
        let toasts = ToastManager::new(&sched, ToastConfig::new().max_toasts(1));
        toasts.toast(ToastOptions::new("first"));
        toasts.toast(ToastOptions::new("second").duration(Duration::from_millis(10)));
        sched.advance(Duration::from_millis(10));
    });
    let evicted = log
        .iter()
        .find(|e| e.message == "toast evicted")
        .expect("eviction logged");
    assert_eq!(evicted.level, Level::DEBUG);
    assert_eq!(evicted.fields.get("id").map(String::as_str), Some("toast-1"));
    let expired = log
        .iter()
        .find(|e| e.message == "toast expired")
        .expect("expiry logged");
    assert_eq!(expired.fields.get("id").map(String::as_str), Some("toast-2"));
}

#[test]
fn ignored_palette_selection_is_logged() {
    let log = capture(|| {
        let registry = ShortcutRegistry::new(Platform::Other);
        let sched = Scheduler::new();
        let _g = registry.register(ShortcutConfig::new(|_| {}).id("build").title("Build"));
        let palette = CommandPalette::new(&registry, &sched, PaletteConfig::default());
        assert!(palette.select("build"));
        assert!(!palette.select("build"));
        sched.run_pending();
    });
    let msgs = messages(&log);
    assert!(
        msgs.contains(&"command selection ignored while another is pending"),
        "log: {msgs:?}"
    );
    assert!(msgs.contains(&"command executed"), "log: {msgs:?}");
}
