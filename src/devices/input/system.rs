//! # Event System
//!
//! Samples the input drivers and turns their state into an ordered stream
//! of typed events.
//!
//! ```text
//! MouseSnapshot ──┬─ delta != 0 ─────────────▶ MouseMove
//!                 └─ buttons ^ previous ─┬─ set ─▶ MouseDown
//!                                        └─ clear ▶ MouseUp, MouseClick
//!                                                   (+ MouseDblClick)
//! key FIFO ──────────────────────────────▶ KeyDown (+ KeyChar if printable)
//! ```
//!
//! A release forms a double-click when the previous release was the same
//! button, within the configured tick window and pixel distance. The click
//! record is then dropped, so a third quick click starts over instead of
//! producing a second double-click.

use log::trace;

use super::events::{Event, EventKind, KeyData, MouseButtons, MouseData};
use super::queue::EventQueue;
use super::source::InputDevices;
use crate::config::DesktopConfig;
use crate::error::GfxError;
use crate::wm::WindowId;

#[derive(Debug, Clone, Copy)]
struct Click {
    button: MouseButtons,
    at: u64,
    x: i32,
    y: i32,
}

pub struct EventSystem<D> {
    devices: D,
    queue: EventQueue,
    prev_buttons: MouseButtons,
    last_click: Option<Click>,
    double_click_ticks: u64,
    double_click_distance: i32,
    dropped: usize,
}

impl<D: InputDevices> EventSystem<D> {
    pub fn new(devices: D, config: &DesktopConfig) -> Self {
        Self {
            devices,
            queue: EventQueue::new(),
            prev_buttons: MouseButtons::empty(),
            last_click: None,
            double_click_ticks: config.double_click_ticks,
            double_click_distance: config.double_click_distance,
            dropped: 0,
        }
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut D {
        &mut self.devices
    }

    /// Sample mouse and keyboard once and queue whatever changed.
    pub fn process_input(&mut self) {
        let now = self.devices.ticks();
        let snap = self.devices.mouse();
        let modifiers = self.devices.modifiers();

        let base = MouseData {
            x: snap.x,
            y: snap.y,
            dx: snap.dx,
            dy: snap.dy,
            button: MouseButtons::empty(),
            buttons: snap.buttons,
            modifiers,
        };

        if snap.dx != 0 || snap.dy != 0 {
            self.enqueue(Event::new(EventKind::MouseMove(base), now));
        }

        let changed = self.prev_buttons ^ snap.buttons;
        for button in [MouseButtons::LEFT, MouseButtons::RIGHT, MouseButtons::MIDDLE] {
            if !changed.contains(button) {
                continue;
            }
            let data = MouseData { button, ..base };
            if snap.buttons.contains(button) {
                self.enqueue(Event::new(EventKind::MouseDown(data), now));
            } else {
                self.enqueue(Event::new(EventKind::MouseUp(data), now));
                self.enqueue(Event::new(EventKind::MouseClick(data), now));
                if self.register_click(button, now, snap.x, snap.y) {
                    self.enqueue(Event::new(EventKind::MouseDblClick(data), now));
                }
            }
        }
        self.prev_buttons = snap.buttons;
        self.devices.clear_mouse_changed();

        while let Some(code) = self.devices.next_key() {
            let data = KeyData {
                code,
                ch: code.printable(),
                modifiers,
            };
            self.enqueue(Event::new(EventKind::KeyDown(data), now));
            if data.ch.is_some() {
                self.enqueue(Event::new(EventKind::KeyChar(data), now));
            }
        }
    }

    /// Record a release; true when it completes a double-click.
    fn register_click(&mut self, button: MouseButtons, now: u64, x: i32, y: i32) -> bool {
        let double = self.last_click.is_some_and(|c| {
            c.button == button
                && now.saturating_sub(c.at) <= self.double_click_ticks
                && (x - c.x).abs() <= self.double_click_distance
                && (y - c.y).abs() <= self.double_click_distance
        });
        self.last_click = if double {
            None
        } else {
            Some(Click { button, at: now, x, y })
        };
        double
    }

    fn enqueue(&mut self, event: Event) {
        if self.queue.push(event).is_err() {
            self.dropped += 1;
            trace!("event queue full, dropped {:?}", event.kind);
        }
    }

    /// Queue an event produced outside the input path (timers, quit requests).
    pub fn push(&mut self, event: Event) -> Result<(), GfxError> {
        self.queue.push(event)
    }

    /// Queue `kind` stamped with the current tick.
    pub fn post(&mut self, kind: EventKind, window: Option<WindowId>) -> Result<(), GfxError> {
        let mut event = Event::new(kind, self.devices.ticks());
        event.window = window;
        self.queue.push(event)
    }

    /// Sample input, then hand out the oldest queued event.
    pub fn poll(&mut self) -> Option<Event> {
        self.process_input();
        self.queue.pop()
    }

    /// Oldest queued event without sampling.
    pub fn pop(&mut self) -> Option<Event> {
        self.queue.pop()
    }

    /// Block until an event exists, halting the CPU between samples.
    pub fn wait(&mut self) -> Event {
        self.wait_with(crate::arch::idle)
    }

    /// [`wait`](Self::wait) with a caller-supplied idle step.
    pub fn wait_with(&mut self, mut idle: impl FnMut()) -> Event {
        loop {
            if let Some(event) = self.poll() {
                return event;
            }
            idle();
        }
    }

    pub fn peek(&self) -> Option<&Event> {
        self.queue.peek()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Events lost to a saturated queue since start-up.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
