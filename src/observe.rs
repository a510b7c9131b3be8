//! Observable values: a shared latest value plus change streams.
//!
//! Readers call [`Observable::get`] for a snapshot or [`Observable::subscribe`]
//! for a stream of every value set afterwards. Subscribers whose receiver
//! was dropped are pruned on the next `set`.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

struct Shared<T> {
    value: T,
    subscribers: Vec<Sender<T>>,
}

pub struct Observable<T> {
    inner: Arc<Mutex<Shared<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Shared {
                value,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        match self.inner.lock() {
            Ok(s) => s.value.clone(),
            Err(poisoned) => poisoned.into_inner().value.clone(),
        }
    }

    /// Store `value` and emit it to every live subscriber.
    pub fn set(&self, value: T) {
        let Ok(mut s) = self.inner.lock() else {
            return;
        };
        s.value = value.clone();
        s.subscribers.retain(|tx| tx.send(value.clone()).is_ok());
    }

    /// Stream of values set from now on.
    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut s) = self.inner.lock() {
            s.subscribers.push(tx);
        }
        rx
    }
}

impl<T: Default + Clone + Send + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_updates_snapshot_and_emits_to_subscribers() {
        let obs = Observable::new(0u32);
        let a = obs.subscribe();
        let b = obs.clone().subscribe();

        obs.set(1);
        obs.set(2);

        assert_eq!(obs.get(), 2);
        assert_eq!(a.try_iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(b.try_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn subscribers_only_see_values_after_subscribing() {
        let obs = Observable::new("a".to_string());
        obs.set("b".to_string());
        let rx = obs.subscribe();
        assert!(rx.try_recv().is_err());
        obs.set("c".to_string());
        assert_eq!(rx.try_recv().unwrap(), "c");
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let obs = Observable::new(false);
        drop(obs.subscribe());
        obs.set(true);
        assert_eq!(obs.inner.lock().unwrap().subscribers.len(), 0);
    }
}
