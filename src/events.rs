use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::error;

use crate::domain::entities::purchase::Purchase;

/// Observer of purchase/entitlement changes (the premium-gating UI).
pub trait PurchaseListener: Send + Sync {
    fn on_purchase(&self, purchase: &Purchase);
}

impl<F> PurchaseListener for F
where
    F: Fn(&Purchase) + Send + Sync,
{
    fn on_purchase(&self, purchase: &Purchase) {
        self(purchase)
    }
}

/// Handle returned by [`PurchaseEventHub::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Synchronous fan-out registry decoupling async purchase completion from
/// UI polling.
///
/// Delivery order across listeners is unspecified. Listeners are isolated:
/// a panicking listener is logged and does not prevent delivery to the
/// rest. Publishing iterates over a snapshot of the registry, so a listener
/// may subscribe or unsubscribe mid-notification without corrupting
/// iteration.
#[derive(Default)]
pub struct PurchaseEventHub {
    listeners: Mutex<Vec<(ListenerId, Arc<dyn PurchaseListener>)>>,
    next_id: AtomicU64,
}

impl PurchaseEventHub {
    pub fn new() -> PurchaseEventHub {
        PurchaseEventHub::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn PurchaseListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|(listener_id, _)| *listener_id != id);
    }

    pub fn publish(&self, purchase: &Purchase) {
        // Copy-on-iterate: the lock is released before any listener runs.
        let snapshot: Vec<Arc<dyn PurchaseListener>> = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            let result = catch_unwind(AssertUnwindSafe(|| listener.on_purchase(purchase)));
            if result.is_err() {
                error!(
                    product_id = %purchase.product_id,
                    "purchase listener panicked during notification"
                );
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
