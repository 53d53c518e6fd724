//! Observable value shared between the parts of the UI that react to it.
//!
//! Subscribers are called synchronously on every change. A `Subscription`
//! unsubscribes when dropped, so its lifetime follows the component holding it.
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<Fn(&T)>;

struct Inner<T> {
    value: T,
    next_id: usize,
    listeners: Vec<(usize, Listener<T>)>,
}

pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Default + Clone + 'static> Default for Observable<T> {
    fn default() -> Self {
        Observable::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl<T: Clone + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                next_id: 0,
                listeners: vec![],
            })),
        }
    }

    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replaces the value and notifies every subscriber
    pub fn set(&self, value: T) {
        self.inner.borrow_mut().value = value;
        self.notify();
    }

    /// Changes the value in place and notifies every subscriber
    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        f(&mut self.inner.borrow_mut().value);
        self.notify();
    }

    pub fn subscribe<F: Fn(&T) + 'static>(&self, listener: F) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            let listener: Listener<T> = Rc::new(listener);
            inner.listeners.push((id, listener));
            id
        };
        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        let unsubscribe: Box<FnMut()> = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.retain(|&(listener_id, _)| listener_id != id);
            }
        });
        Subscription {
            unsubscribe: Some(unsubscribe),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn notify(&self) {
        // listeners may subscribe or read the value while being notified
        let (value, listeners) = {
            let inner = self.inner.borrow();
            let listeners: Vec<Listener<T>> = inner.listeners.iter().map(|&(_, ref listener)| listener.clone()).collect();
            (inner.value.clone(), listeners)
        };
        for listener in listeners {
            listener(&value);
        }
    }
}

/// Handle of a subscription, unsubscribes on drop
pub struct Subscription {
    unsubscribe: Option<Box<FnMut()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(mut unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_subscribers_see_changes_until_dropped() {
        let observable = Observable::new(0);
        let seen = Rc::new(Cell::new(0));

        let subscription = {
            let seen = seen.clone();
            observable.subscribe(move |value| seen.set(*value))
        };
        observable.set(3);
        assert_eq!(seen.get(), 3);

        drop(subscription);
        observable.set(5);
        assert_eq!(seen.get(), 3);
        assert_eq!(observable.get(), 5);
        assert_eq!(observable.subscriber_count(), 0);
    }

    #[test]
    fn test_update_in_place() {
        let observable: Observable<Vec<u32>> = Observable::default();
        let count = Rc::new(Cell::new(0));
        let _subscription = {
            let count = count.clone();
            observable.subscribe(move |values: &Vec<u32>| count.set(values.len()))
        };
        observable.update(|values| values.push(1));
        observable.update(|values| values.push(2));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_listener_may_read_while_notified() {
        let observable = Observable::new(1);
        let reader = observable.clone();
        let seen = Rc::new(Cell::new(0));
        let subscription = {
            let seen = seen.clone();
            observable.subscribe(move |_| seen.set(reader.get()))
        };
        observable.set(9);
        assert_eq!(seen.get(), 9);
        subscription.unsubscribe();
        assert_eq!(observable.subscriber_count(), 0);
    }
}
