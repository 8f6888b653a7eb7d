#![allow(dead_code)]

use std::collections::VecDeque;

use desktop::devices::framebuffer::Channel;
use desktop::devices::input::{KeyCode, Modifiers, MouseButtons, MouseSnapshot};
use desktop::{DisplayInfo, DisplaySurface, InputDevices};

/// Input devices driven by the test body.
#[derive(Default)]
pub struct Scripted {
    pub now: u64,
    pub mouse: MouseSnapshot,
    pub keys: VecDeque<KeyCode>,
    pub modifiers: Modifiers,
}

impl Scripted {
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.mouse.dx += x - self.mouse.x;
        self.mouse.dy += y - self.mouse.y;
        self.mouse.x = x;
        self.mouse.y = y;
        self.mouse.moved = true;
    }

    pub fn press(&mut self, button: MouseButtons) {
        self.mouse.buttons.insert(button);
    }

    pub fn release(&mut self, button: MouseButtons) {
        self.mouse.buttons.remove(button);
    }

    pub fn advance(&mut self, ticks: u64) {
        self.now += ticks;
    }
}

impl InputDevices for Scripted {
    fn ticks(&self) -> u64 {
        self.now
    }

    fn mouse(&mut self) -> MouseSnapshot {
        self.mouse
    }

    fn clear_mouse_changed(&mut self) {
        self.mouse.dx = 0;
        self.mouse.dy = 0;
        self.mouse.moved = false;
    }

    fn next_key(&mut self) -> Option<KeyCode> {
        self.keys.pop_front()
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

/// 32 bpp, blue in the low byte.
pub fn display_info(width: usize, height: usize) -> DisplayInfo {
    DisplayInfo {
        width,
        height,
        stride: width,
        bits_per_pixel: 32,
        red: Channel::new(16, 8),
        green: Channel::new(8, 8),
        blue: Channel::new(0, 8),
    }
}

/// A surface over leaked memory prefilled with `fill`.
pub fn surface_filled(width: usize, height: usize, fill: u8) -> DisplaySurface {
    let info = display_info(width, height);
    let hw = Box::leak(vec![fill; info.required_len()].into_boxed_slice());
    DisplaySurface::new(info, hw).expect("surface")
}

pub fn surface(width: usize, height: usize) -> DisplaySurface {
    surface_filled(width, height, 0)
}
