//! Transient on-screen notifications.
//!
//! [`NotificationStack`] is the plain data model (order, phase, opacity and
//! stacking offsets). [`Notifier`] owns one and feeds it timed lifecycle
//! events, so the stack can be tested without a renderer or a clock.

mod notifier;
mod stack;

pub use notifier::{NotificationTiming, Notifier};
pub use stack::{
    LifecycleEvent, Notification, NotificationId, NotificationStack, Phase, TransitionProperty,
};
