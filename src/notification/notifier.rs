use super::stack::{
    LifecycleEvent, Notification, NotificationId, NotificationStack, TransitionProperty,
};
use crate::types::Severity;
use log::debug;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};
use tokio::{
    sync::watch,
    task::AbortHandle,
    time::{Instant, sleep, sleep_until},
};

/// Durations of the notification lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotificationTiming {
    /// Delay until the first frame, when the notification is stacked
    pub frame: Duration,
    /// Time from creation until fade-out starts
    pub linger: Duration,
    /// Length of the fade transitions
    pub fade: Duration,
}

impl Default for NotificationTiming {
    fn default() -> Self {
        Self {
            frame: Duration::from_millis(16),
            linger: Duration::from_millis(2000),
            fade: Duration::from_millis(180),
        }
    }
}

struct State {
    stack: NotificationStack,
    tasks: HashMap<NotificationId, AbortHandle>,
}

struct Inner {
    state: Mutex<State>,
    timing: NotificationTiming,
    view: watch::Sender<Vec<Notification>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, task) in state.tasks.drain() {
            task.abort();
        }
    }
}

/// Drives a [`NotificationStack`] with one timer task per notification.
///
/// Each task delivers the lifecycle events of its notification and can be
/// cancelled through [`Notifier::dismiss`]. Dropping the last handle aborts
/// every pending task.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

impl Notifier {
    pub fn new(base_top: Option<f32>, timing: NotificationTiming) -> Self {
        let (view, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    stack: NotificationStack::new(base_top),
                    tasks: HashMap::new(),
                }),
                timing,
                view,
            }),
        }
    }

    /// Show a message and schedule its lifecycle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let mut state = self.lock();
        let id = state.stack.push(message, severity);
        let task = tokio::spawn(drive(Arc::downgrade(&self.inner), id, self.inner.timing));
        state.tasks.insert(id, task.abort_handle());
        self.publish(&state);
        id
    }

    /// Deliver a lifecycle event, e.g. a transition end reported by a renderer.
    pub fn apply(&self, event: LifecycleEvent) -> bool {
        Self::apply_to(&self.inner, event)
    }

    /// Remove a notification before its lifecycle completes.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut state = self.lock();
        if let Some(task) = state.tasks.remove(&id) {
            task.abort();
        }
        let removed = state.stack.remove(id);
        if removed {
            self.publish(&state);
        }
        removed
    }

    pub fn set_height(&self, id: NotificationId, height: f32) -> bool {
        let mut state = self.lock();
        let updated = state.stack.set_height(id, height);
        if updated {
            self.publish(&state);
        }
        updated
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().stack.items().to_vec()
    }

    pub fn baseline(&self) -> Option<f32> {
        self.lock().stack.baseline()
    }

    /// Number of lifecycle tasks that have not completed yet.
    pub fn pending_tasks(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.view.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        Self::lock_inner(&self.inner)
    }

    fn publish(&self, state: &State) {
        Self::publish_inner(&self.inner, state);
    }

    fn lock_inner(inner: &Inner) -> MutexGuard<'_, State> {
        inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_inner(inner: &Inner, state: &State) {
        inner.view.send_replace(state.stack.items().to_vec());
    }

    fn apply_to(inner: &Inner, event: LifecycleEvent) -> bool {
        let mut state = Self::lock_inner(inner);
        let applied = state.stack.apply(event);
        if let LifecycleEvent::TransitionEnd { id, .. } = event {
            if applied {
                state.tasks.remove(&id);
            }
        }
        if applied {
            Self::publish_inner(inner, &state);
        } else {
            debug!("ignored notification event {event:?}");
        }
        applied
    }
}

async fn drive(inner: Weak<Inner>, id: NotificationId, timing: NotificationTiming) {
    let created = Instant::now();

    let deliver = |event| match inner.upgrade() {
        Some(inner) => Notifier::apply_to(&inner, event),
        None => false,
    };

    sleep(timing.frame).await;
    if !deliver(LifecycleEvent::Shown(id)) {
        return;
    }

    sleep_until(created + timing.linger).await;
    if !deliver(LifecycleEvent::Leave(id)) {
        return;
    }

    sleep(timing.fade).await;
    deliver(LifecycleEvent::TransitionEnd {
        id,
        property: TransitionProperty::Opacity,
    });
}
