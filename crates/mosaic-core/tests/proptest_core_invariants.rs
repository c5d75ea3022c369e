//! Property-based invariant tests for viewport clamping and the scheduler.
//!
//! 1. A clamped box that fits the inset viewport lies entirely inside it.
//! 2. Clamping never moves an origin above or left of the inset edge.
//! 3. Clamping is idempotent.
//! 4. Scheduled tasks run exactly once, in (due, scheduling order) order.
//! 5. Cancelled tasks never run.

use mosaic_core::geometry::{Point, Size, clamp_to_viewport};
use mosaic_core::scheduler::Scheduler;
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const INSET: f64 = 8.0;

// ── Helpers ─────────────────────────────────────────────────────────────

fn point_strategy() -> impl Strategy<Value = Point> {
    (-2000i32..4000, -2000i32..4000).prop_map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
}

fn size_strategy(max: i32) -> impl Strategy<Value = Size> {
    (0i32..max, 0i32..max).prop_map(|(w, h)| Size::new(f64::from(w), f64::from(h)))
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Fitting boxes land inside the inset viewport
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn fitting_box_is_fully_visible(origin in point_strategy(), size in size_strategy(300)) {
        let viewport = Size::new(1024.0, 768.0);
        let p = clamp_to_viewport(origin, size, viewport, INSET);
        prop_assert!(p.x >= INSET && p.y >= INSET);
        prop_assert!(p.x + size.width <= viewport.width - INSET);
        prop_assert!(p.y + size.height <= viewport.height - INSET);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Never above/left of the inset edge
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn origin_never_escapes_top_left(
        origin in point_strategy(),
        size in size_strategy(3000),
        viewport in size_strategy(2000),
    ) {
        let p = clamp_to_viewport(origin, size, viewport, INSET);
        prop_assert!(p.x >= INSET, "x={} for {:?}", p.x, origin);
        prop_assert!(p.y >= INSET, "y={} for {:?}", p.y, origin);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clamp_idempotent(origin in point_strategy(), size in size_strategy(500)) {
        let viewport = Size::new(800.0, 600.0);
        let once = clamp_to_viewport(origin, size, viewport, INSET);
        let twice = clamp_to_viewport(once, size, viewport, INSET);
        prop_assert_eq!(once, twice);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Ordering and exactly-once execution
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tasks_run_once_in_order(delays in proptest::collection::vec(0u64..50, 0..40)) {
        let sched = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (i, d) in delays.iter().enumerate() {
            let log = Rc::clone(&log);
            sched.schedule(Duration::from_millis(*d), move || log.borrow_mut().push(i));
        }
        let ran = sched.advance(Duration::from_millis(100));
        prop_assert_eq!(ran, delays.len());
        prop_assert_eq!(sched.pending_count(), 0);

        let mut expected: Vec<usize> = (0..delays.len()).collect();
        expected.sort_by_key(|&i| (delays[i], i));
        prop_assert_eq!(log.borrow().clone(), expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Cancelled tasks never run
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn cancelled_tasks_never_run(
        delays in proptest::collection::vec((0u64..50, any::<bool>()), 0..40),
    ) {
        let sched = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut kept = Vec::new();
        for (i, (d, cancel)) in delays.iter().enumerate() {
            let log = Rc::clone(&log);
            let id = sched.schedule(Duration::from_millis(*d), move || log.borrow_mut().push(i));
            if *cancel {
                prop_assert!(sched.cancel(id));
            } else {
                kept.push(i);
            }
        }
        sched.advance(Duration::from_millis(60));
        let mut seen = log.borrow().clone();
        seen.sort_unstable();
        prop_assert_eq!(seen, kept);
    }
}
