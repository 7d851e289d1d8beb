//! Interrupt callbacks.
//!
//! Handlers are stored per [`Event`] in a slot guarded by a critical section.
//! Replacing a handler is a single store inside the critical section, so an
//! interrupt observes either the old or the new handler. Dispatch copies the
//! handler out of its slot and calls it outside the critical section, which
//! allows a handler to re-register itself or others.

use core::cell::Cell;

use critical_section::Mutex;

use crate::Channel;

/// Hardware events that can have a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The counter of the channel wrapped at its modulo value.
    Overflow(Channel),
}

impl Event {
    /// The number of distinct events.
    pub const COUNT: usize = Channel::COUNT;

    #[inline]
    const fn index(self) -> usize {
        match self {
            Event::Overflow(channel) => channel.index(),
        }
    }
}

/// A registered event handler.
#[derive(Debug, Clone, Copy, Default)]
pub enum Callback {
    /// Nothing is called.
    #[default]
    Noop,
    /// The function is called from the interrupt with the event that fired.
    Handler(fn(Event)),
}

impl Callback {
    #[inline]
    pub fn is_noop(&self) -> bool {
        matches!(self, Callback::Noop)
    }

    /// Invoke the handler, returns whether anything was called.
    #[inline]
    pub fn invoke(self, event: Event) -> bool {
        match self {
            Callback::Noop => false,
            Callback::Handler(f) => {
                f(event);
                true
            }
        }
    }
}

impl From<fn(Event)> for Callback {
    fn from(f: fn(Event)) -> Self {
        Callback::Handler(f)
    }
}

/// The handlers of all events, usable from a `static`.
pub struct CallbackRegistry {
    slots: [Mutex<Cell<Callback>>; Event::COUNT],
}

impl CallbackRegistry {
    /// Create a registry where every event is a no-op.
    pub const fn new() -> Self {
        Self {
            slots: [const { Mutex::new(Cell::new(Callback::Noop)) }; Event::COUNT],
        }
    }

    /// Replace the handler of `event`, returning the previous one.
    pub fn register(&self, event: Event, callback: Callback) -> Callback {
        critical_section::with(|cs| self.slots[event.index()].borrow(cs).replace(callback))
    }

    /// Get the current handler of `event`.
    pub fn get(&self, event: Event) -> Callback {
        critical_section::with(|cs| self.slots[event.index()].borrow(cs).get())
    }

    /// Invoke the handler of `event` if one is registered.
    ///
    /// Returns whether a handler was called.
    pub fn dispatch(&self, event: Event) -> bool {
        self.get(event).invoke(event)
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}
