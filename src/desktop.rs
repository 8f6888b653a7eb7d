//! # Desktop
//!
//! The context object the run loop owns: display surface, window manager,
//! event system and pointer cursor, constructed once and passed around
//! explicitly.
//!
//! ```text
//!  ┌─────────── step() ───────────────────────────────────────────┐
//!  │ pump_events: sample input → dispatch each event to the WM    │
//!  │ render_frame: redraw_all → composite → erase cursor → flush  │
//!  │               → draw cursor                                  │
//!  └──────────────────────────────────────────────────────────────┘
//! ```

use bootloader_api::info::FrameBuffer;
use log::info;

use crate::config::DesktopConfig;
use crate::devices::framebuffer::info::DisplayInfo;
use crate::devices::framebuffer::surface::DisplaySurface;
use crate::devices::input::events::EventKind;
use crate::devices::input::source::InputDevices;
use crate::devices::input::system::EventSystem;
use crate::devices::mouse_cursor::Cursor;
use crate::error::{GfxError, GfxResult};
use crate::wm::WindowManager;

pub struct Desktop<D> {
    surface: DisplaySurface,
    wm: WindowManager,
    events: EventSystem<D>,
    cursor: Cursor,
}

impl<D: InputDevices> Desktop<D> {
    pub fn new(surface: DisplaySurface, devices: D, config: DesktopConfig) -> Self {
        let (w, h) = (surface.info().width, surface.info().height);
        let wm = WindowManager::new(w, h, config);
        let mut cursor = Cursor::new(w as i32 / 2, h as i32 / 2);
        let (outline, fill) = wm.theme().cursor;
        cursor.set_colors(outline, fill);
        Self {
            surface,
            wm,
            events: EventSystem::new(devices, &config),
            cursor,
        }
    }

    /// Take over the bootloader's framebuffer. Without one there is no
    /// desktop to run.
    pub fn from_boot_framebuffer(
        framebuffer: Option<&'static mut FrameBuffer>,
        devices: D,
        config: DesktopConfig,
    ) -> GfxResult<Self> {
        let fb = framebuffer.ok_or(GfxError::NoDisplay)?;
        let surface = DisplaySurface::from_boot_framebuffer(fb)?;
        Ok(Self::new(surface, devices, config))
    }

    pub fn surface(&self) -> &DisplaySurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DisplaySurface {
        &mut self.surface
    }

    pub fn wm(&self) -> &WindowManager {
        &self.wm
    }

    pub fn wm_mut(&mut self) -> &mut WindowManager {
        &mut self.wm
    }

    pub fn events(&self) -> &EventSystem<D> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventSystem<D> {
        &mut self.events
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    /// Sample input once and dispatch everything queued. Returns false once
    /// a `Quit` event has been seen.
    pub fn pump_events(&mut self) -> bool {
        self.events.process_input();
        while let Some(event) = self.events.pop() {
            if event.kind == EventKind::Quit {
                info!("desktop: quit requested");
                return false;
            }
            if let Some(m) = event.mouse() {
                self.cursor.set_position(m.x, m.y);
            }
            self.wm.dispatch(&event);
        }
        true
    }

    /// Produce one frame. Returns whether hardware memory was touched.
    pub fn render_frame(&mut self) -> bool {
        self.wm.redraw_all();
        let composited = self.wm.composite(&mut self.surface);
        if !composited && !self.cursor.needs_redraw() {
            return false;
        }
        self.cursor.erase(&mut self.surface);
        self.surface.flush();
        self.cursor.draw(&mut self.surface);
        true
    }

    pub fn step(&mut self) -> bool {
        let running = self.pump_events();
        self.render_frame();
        running
    }

    /// Run until `Quit`, idling the CPU between iterations.
    pub fn run(&mut self) {
        while self.step() {
            crate::arch::idle();
        }
    }

    /// Switch to a new mode. On failure the current display stays in use.
    pub fn set_display(&mut self, info: DisplayInfo, hardware: &'static mut [u8]) -> GfxResult<()> {
        self.cursor.erase(&mut self.surface);
        self.surface.reinit(info, hardware)?;
        self.wm.set_screen_size(info.width, info.height);
        self.events.devices_mut().set_bounds(info.width, info.height);
        let p = self.cursor.position();
        self.cursor.set_position(
            p.x.clamp(0, info.width as i32 - 1),
            p.y.clamp(0, info.height as i32 - 1),
        );
        Ok(())
    }
}
