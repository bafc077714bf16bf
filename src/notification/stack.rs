use crate::types::Severity;
use serde::Serialize;

pub type NotificationId = u64;

/// Where a notification is in its enter/linger/leave sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Entering,
    Visible,
    Leaving,
}

/// Animated property whose transition finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionProperty {
    Top,
    Opacity,
}

/// Timed signals that move a notification through its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// First animation frame after creation: stack it and fade in.
    Shown(NotificationId),
    /// Linger time is over: start fading out.
    Leave(NotificationId),
    /// A transition completed on the rendered element.
    TransitionEnd {
        id: NotificationId,
        property: TransitionProperty,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub phase: Phase,
    pub opacity: f32,
    /// Stacking offset; `None` until the first reflow that includes it.
    pub top: Option<f32>,
    pub height: f32,
}

/// Ordered stack of on-screen notifications, oldest on top.
///
/// Positions and opacity are derived state. The renderer reads them and
/// reports measured heights and transition completions back.
#[derive(Clone, Debug)]
pub struct NotificationStack {
    items: Vec<Notification>,
    counter: NotificationId,
    configured_top: Option<f32>,
    baseline: Option<f32>,
}

impl NotificationStack {
    /// Vertical gap between stacked notifications.
    pub const GAP: f32 = 8.0;
    /// Baseline used when the renderer did not configure one.
    pub const FALLBACK_TOP: f32 = 16.0;
    /// Height assumed until the renderer measures the element.
    pub const DEFAULT_HEIGHT: f32 = 48.0;

    pub fn new(configured_top: Option<f32>) -> Self {
        Self {
            items: Vec::new(),
            counter: 0,
            configured_top,
            baseline: None,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity) -> NotificationId {
        self.counter += 1;
        let id = self.counter;
        self.items.push(Notification {
            id,
            message: message.into(),
            severity,
            phase: Phase::Entering,
            opacity: 0.0,
            top: None,
            height: Self::DEFAULT_HEIGHT,
        });
        id
    }

    /// Apply a lifecycle event. Returns `false` when it did not apply, e.g.
    /// because the notification is already gone.
    pub fn apply(&mut self, event: LifecycleEvent) -> bool {
        match event {
            LifecycleEvent::Shown(id) => {
                if !self.is_in_phase(id, &[Phase::Entering]) {
                    return false;
                }
                self.reflow();
                self.update(id, |n| {
                    n.phase = Phase::Visible;
                    n.opacity = 1.0;
                })
            }
            LifecycleEvent::Leave(id) => self.update(id, |n| {
                if n.phase != Phase::Leaving {
                    n.phase = Phase::Leaving;
                    n.opacity = 0.0;
                }
            }),
            LifecycleEvent::TransitionEnd { id, property } => {
                if property != TransitionProperty::Opacity
                    || !self.is_in_phase(id, &[Phase::Leaving])
                {
                    return false;
                }
                self.remove(id)
            }
        }
    }

    /// Remove a notification and restack the rest.
    pub fn remove(&mut self, id: NotificationId) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        if self.items.len() == before {
            return false;
        }
        self.reflow();
        true
    }

    /// Record the rendered height of a notification.
    pub fn set_height(&mut self, id: NotificationId, height: f32) -> bool {
        let updated = self.update(id, |n| n.height = height.max(0.0));
        if updated && self.items.iter().any(|n| n.top.is_some()) {
            self.reflow();
        }
        updated
    }

    /// Restack every notification from the baseline.
    ///
    /// The baseline is captured on the first reflow that sees a notification
    /// and kept for the lifetime of the stack. Safe to call any number of
    /// times.
    pub fn reflow(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let baseline = *self
            .baseline
            .get_or_insert(self.configured_top.unwrap_or(Self::FALLBACK_TOP));

        let mut current = baseline;
        for n in &mut self.items {
            n.top = Some(current);
            current += n.height + Self::GAP;
        }
    }

    pub fn baseline(&self) -> Option<f32> {
        self.baseline
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn is_in_phase(&self, id: NotificationId, phases: &[Phase]) -> bool {
        self.get(id).is_some_and(|n| phases.contains(&n.phase))
    }

    fn update(&mut self, id: NotificationId, f: impl FnOnce(&mut Notification)) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                f(n);
                true
            }
            None => false,
        }
    }
}

impl Default for NotificationStack {
    fn default() -> Self {
        Self::new(None)
    }
}
