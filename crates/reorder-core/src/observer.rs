//! Position observer.
//!
//! Detects when an element moves relative to the viewport without polling
//! its geometry against every other element. The element's current
//! rectangle is used as the observation root (the viewport inset by the
//! element's own margins), so any movement changes the intersection ratio
//! and triggers a re-measure. Hosts drive the observer by calling
//! [`MoveObserver::poll`] once per frame.

use crate::config::ObserverConfig;
use crate::tree::{NodeId, NodeTree};
use kurbo::{Rect, Size};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Threshold used when re-arming after a fully clipped observation.
const CLIPPED_THRESHOLD: f64 = 1e-7;

/// Ratios closer than this are considered equal.
const RATIO_EPSILON: f64 = 1e-9;

/// An armed observation: the shrunken root and the ratio it expects.
#[derive(Debug, Clone, Copy)]
struct Armed {
    root: Rect,
    threshold: f64,
}

impl Armed {
    fn ratio(&self, rect: Rect) -> f64 {
        let area = rect.area();
        if area <= 0.0 {
            return 0.0;
        }
        let overlap = rect.intersect(self.root);
        (overlap.area() / area).clamp(0.0, 1.0)
    }
}

/// Tracks one element's viewport rectangle and reports when it moves.
#[derive(Debug, Clone)]
pub struct MoveObserver {
    node: NodeId,
    config: ObserverConfig,
    armed: Option<Armed>,
    /// Deadline for the throttled re-arm after a clipped observation.
    rearm_at: Option<Instant>,
    /// The next observation is the initial callback after arming.
    first_update: bool,
    /// Report the initial measurement on the first poll.
    report_initial: bool,
    last_ratio: f64,
    last_size: Option<Size>,
    inert: bool,
    cancelled: bool,
}

impl MoveObserver {
    /// Start observing `node`.
    ///
    /// Unless `skip_initial` is set, the first [`poll`](Self::poll) reports
    /// the element's current rectangle. Without a viewport the observer is
    /// inert and never reports.
    pub fn observe(tree: &dyn NodeTree, node: NodeId, config: &ObserverConfig, skip_initial: bool) -> Self {
        let mut observer = Self {
            node,
            config: config.clone(),
            armed: None,
            rearm_at: None,
            first_update: true,
            report_initial: !skip_initial,
            last_ratio: 1.0,
            last_size: None,
            inert: tree.viewport().is_none(),
            cancelled: false,
        };
        if observer.inert {
            log::trace!("No viewport, observer for {:?} is inert", node);
        } else {
            observer.refresh(tree, true, 1.0, false);
        }
        observer
    }

    /// The observed node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Whether this observer will never report (no viewport or cancelled).
    pub fn is_inert(&self) -> bool {
        self.inert || self.cancelled
    }

    /// Whether a throttled re-arm is waiting.
    pub fn is_throttled(&self) -> bool {
        self.rearm_at.is_some()
    }

    /// Check the element for movement.
    ///
    /// Returns `true` when a move was detected and `is_enabled` allowed it
    /// to be forwarded. Disabled observers keep re-arming but drop the
    /// notification.
    pub fn poll(&mut self, tree: &dyn NodeTree, now: Instant, is_enabled: impl FnOnce() -> bool) -> bool {
        if self.is_inert() {
            return false;
        }

        if std::mem::take(&mut self.report_initial) {
            return is_enabled();
        }

        if let Some(deadline) = self.rearm_at {
            if now >= deadline {
                return self.refresh(tree, false, CLIPPED_THRESHOLD, is_enabled());
            }
        }

        // Detached elements are a transient state; try again next poll.
        let Some(rect) = tree.rect(self.node) else {
            return false;
        };
        let resized = self.last_size != Some(rect.size());

        let Some(armed) = self.armed else {
            // Zero-size elements aren't armed; wait for them to gain a size.
            if resized {
                return self.refresh(tree, false, 1.0, is_enabled());
            }
            return false;
        };

        let ratio = armed.ratio(rect);
        let first = std::mem::take(&mut self.first_update);
        let changed = first || (ratio - self.last_ratio).abs() > RATIO_EPSILON;
        self.last_ratio = ratio;

        if changed && (ratio - armed.threshold).abs() > RATIO_EPSILON {
            if !first {
                return self.refresh(tree, false, 1.0, is_enabled());
            }
            if ratio == 0.0 {
                // Fully clipped: throttle the refresh to avoid an update storm.
                self.rearm_at = Some(now + self.config.clipped_rearm);
                log::trace!("Observer for {:?} clipped, re-arming later", self.node);
                return false;
            }
            return self.refresh(tree, false, ratio, is_enabled());
        }

        if resized {
            return self.refresh(tree, false, armed.threshold, is_enabled());
        }
        false
    }

    /// Stop observing. Safe to call more than once.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.armed = None;
        self.rearm_at = None;
        self.report_initial = false;
    }

    /// Re-measure and re-arm. Returns whether the move is forwarded.
    fn refresh(&mut self, tree: &dyn NodeTree, skip: bool, threshold: f64, enabled: bool) -> bool {
        self.armed = None;
        self.rearm_at = None;
        let forward = !skip && enabled;

        let (Some(rect), Some(viewport)) = (tree.rect(self.node), tree.viewport()) else {
            return forward;
        };
        self.last_size = Some(rect.size());
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return forward;
        }

        let inset_top = (rect.y0 - viewport.y0).floor();
        let inset_right = (viewport.x1 - rect.x1).floor();
        let inset_bottom = (viewport.y1 - rect.y1).floor();
        let inset_left = (rect.x0 - viewport.x0).floor();
        let root = Rect::new(
            viewport.x0 + inset_left,
            viewport.y0 + inset_top,
            viewport.x1 - inset_right,
            viewport.y1 - inset_bottom,
        );

        let threshold = threshold.clamp(0.0, 1.0);
        self.armed = Some(Armed {
            root,
            threshold: if threshold == 0.0 { 1.0 } else { threshold },
        });
        self.first_update = true;
        self.last_ratio = threshold;
        forward
    }
}
