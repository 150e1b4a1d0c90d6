use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Listener registration for single-threaded collaborators.
///
/// Subscribing returns a [`ListenerHandle`]; dropping (or explicitly
/// releasing) the handle detaches the listener, so a scene that subscribes in
/// `on_create` and releases in `on_remove` can never leave a dangling
/// callback behind.
pub struct ListenerHub<T> {
    inner: Rc<RefCell<Slots<T>>>,
}

struct Slots<T> {
    next_id: u64,
    listeners: Vec<(u64, Box<dyn Fn(&T)>)>,
}

/// Detaches its listener when released or dropped.
pub struct ListenerHandle {
    detach: Option<Box<dyn FnOnce()>>,
}

impl<T: 'static> ListenerHub<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Slots {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(&T) + 'static,
    {
        let id = {
            let mut slots = self.inner.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.listeners.push((id, Box::new(listener)));
            id
        };

        let weak: Weak<RefCell<Slots<T>>> = Rc::downgrade(&self.inner);
        ListenerHandle {
            detach: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    pub fn emit(&self, value: &T) {
        let inner = self.inner.borrow();
        for (_, listener) in inner.listeners.iter() {
            listener(value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl<T: 'static> Default for ListenerHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerHandle {
    /// Detach the listener now instead of waiting for drop.
    pub fn release(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn listener_receives_emits() {
        let hub: ListenerHub<u32> = ListenerHub::new();
        let seen = Rc::new(Cell::new(0u32));
        let seen_clone = seen.clone();
        let _handle = hub.subscribe(move |v| seen_clone.set(seen_clone.get() + v));

        hub.emit(&2);
        hub.emit(&3);
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn dropping_handle_detaches() {
        let hub: ListenerHub<u32> = ListenerHub::new();
        let seen = Rc::new(Cell::new(0u32));
        let seen_clone = seen.clone();
        let handle = hub.subscribe(move |v| seen_clone.set(*v));

        drop(handle);
        hub.emit(&7);
        assert_eq!(seen.get(), 0);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn release_detaches_only_its_own_listener() {
        let hub: ListenerHub<u32> = ListenerHub::new();
        let a = hub.subscribe(|_| {});
        let _b = hub.subscribe(|_| {});

        a.release();
        assert_eq!(hub.listener_count(), 1);
    }
}
