//! Single "bracket pairs changed" channel.
//!
//! A notification means a later query may return something different from
//! an identical earlier query. It carries no payload; subscribers re-query.

use std::fmt;

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct ChangeNotifier {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Box<dyn FnMut()>)>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether `id` was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Calls every listener in subscription order.
    pub fn fire(&mut self) {
        log::trace!("notifying {} listeners", self.listeners.len());
        for (_, listener) in &mut self.listeners {
            listener();
        }
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn fires_every_listener_until_unsubscribed() {
        let count = Rc::new(Cell::new(0));
        let mut notifier = ChangeNotifier::new();

        let first = notifier.subscribe({
            let count = count.clone();
            move || count.set(count.get() + 1)
        });
        notifier.subscribe({
            let count = count.clone();
            move || count.set(count.get() + 10)
        });

        notifier.fire();
        assert_eq!(count.get(), 11);

        assert!(notifier.unsubscribe(first));
        assert!(!notifier.unsubscribe(first));
        notifier.fire();
        assert_eq!(count.get(), 21);
        assert_eq!(notifier.listener_count(), 1);
    }
}
