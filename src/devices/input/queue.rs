//! Fixed-capacity FIFO between the event system (producer) and the run loop
//! (consumer).

use heapless::Deque;

use super::events::Event;
use crate::config::EVENT_QUEUE_CAPACITY;
use crate::error::GfxError;

pub struct EventQueue {
    events: Deque<Event, EVENT_QUEUE_CAPACITY>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Deque::new() }
    }

    /// Append at the tail. A saturated queue refuses the event and the
    /// caller gets it back as `QueueFull`; nothing blocks.
    pub fn push(&mut self, event: Event) -> Result<(), GfxError> {
        self.events.push_back(event).map_err(|_| GfxError::QueueFull)
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn peek(&self) -> Option<&Event> {
        self.events.front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.events.is_full()
    }

    pub const fn capacity(&self) -> usize {
        EVENT_QUEUE_CAPACITY
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::input::events::EventKind;

    #[test]
    fn fifo_order() {
        let mut q = EventQueue::new();
        q.push(Event::new(EventKind::Timer(1), 1)).unwrap();
        q.push(Event::new(EventKind::Timer(2), 2)).unwrap();
        assert_eq!(q.peek().map(|e| e.timestamp), Some(1));
        assert_eq!(q.pop().map(|e| e.kind), Some(EventKind::Timer(1)));
        assert_eq!(q.pop().map(|e| e.kind), Some(EventKind::Timer(2)));
        assert!(q.pop().is_none());
    }

    #[test]
    fn full_queue_refuses() {
        let mut q = EventQueue::new();
        for i in 0..q.capacity() {
            q.push(Event::new(EventKind::Timer(i as u32), 0)).unwrap();
        }
        assert!(q.is_full());
        assert_eq!(q.push(Event::new(EventKind::Quit, 0)), Err(GfxError::QueueFull));
        assert_eq!(q.len(), q.capacity());
        // head is still the first event
        assert_eq!(q.peek().map(|e| e.kind), Some(EventKind::Timer(0)));
    }
}
