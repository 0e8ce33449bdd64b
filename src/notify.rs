//! Process-wide default-output-device change notifications.
//!
//! Hosts signal "the system default output changed" through a process-wide
//! mechanism rather than per-stream events. This module models that as an
//! explicit registry: adapters subscribe a callback at construction and hold
//! the returned guard, which deregisters on drop so no instance leaks a
//! dangling registration after teardown. Backends or embedding applications
//! call [`default_output_changed`] when the operating system reports a
//! default-device move.

use std::sync::OnceLock;

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

type ChangeCallback = Box<dyn Fn() + Send + Sync>;

fn registry() -> &'static DashMap<Uuid, ChangeCallback> {
    static REGISTRY: OnceLock<DashMap<Uuid, ChangeCallback>> = OnceLock::new();
    REGISTRY.get_or_init(DashMap::new)
}

/// Scoped handle for one subscription. Dropping it deregisters the callback.
pub struct SubscriptionGuard {
    id: Uuid,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        registry().remove(&self.id);
    }
}

/// Register `callback` to run whenever the host default output changes.
pub fn subscribe<F>(callback: F) -> SubscriptionGuard
where
    F: Fn() + Send + Sync + 'static,
{
    let id = Uuid::new_v4();
    registry().insert(id, Box::new(callback));
    SubscriptionGuard { id }
}

/// Announce that the host's default output device changed.
///
/// Callbacks run synchronously on the calling thread, which therefore must
/// not hold any lock a callback may take.
pub fn default_output_changed() {
    debug!(
        "system default output device changed, notifying {} listener(s)",
        registry().len()
    );
    for entry in registry().iter() {
        (entry.value())();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    #[serial]
    fn test_subscription_receives_notifications() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        let guard = subscribe(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        default_output_changed();
        default_output_changed();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        drop(guard);
    }

    #[test]
    #[serial]
    fn test_dropped_guard_deregisters() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        let guard = subscribe(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        default_output_changed();
        drop(guard);
        default_output_changed();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
