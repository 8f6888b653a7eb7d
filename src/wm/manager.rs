//! # Window Manager
//!
//! Owns every window, their stacking order and focus, and turns input
//! events into window operations.
//!
//! ## Stacking
//!
//! Windows live in an arena addressed by [`WindowId`]. `z_order` lists the
//! live handles bottom to top; the focused window, when there is one, is
//! always last.
//!
//! ## Pointer state machine
//!
//! ```text
//!            MouseDown on title bar              MouseDown on grip
//!   ┌──────┐ ─────────────────────▶ ┌────────┐   ┌──────────┐
//!   │ Idle │                        │ Moving │   │ Resizing │
//!   └──────┘ ◀───────────────────── └────────┘   └──────────┘
//!       ▲      MouseUp: one WindowMove                │
//!       └─────────────────────────────────────────────┘
//!                    MouseUp: one WindowResize
//! ```
//!
//! ## Frame
//!
//! [`redraw_all`](WindowManager::redraw_all) lets owners repaint dirty
//! client buffers; [`composite`](WindowManager::composite) then rebuilds
//! the damaged part of the backbuffer bottom to top: desktop, shadow,
//! frame, client.

use alloc::boxed::Box;
use alloc::vec::Vec;

use embedded_graphics::mono_font::{ascii::FONT_8X13, MonoFont};
use log::{debug, info, warn};

use super::decor::{self, Button, Hit};
use super::window::{
    alloc_buffer, client_rect, default_reply, truncated, Reply, Window, WindowFlags, WindowHandler,
    WindowId,
};
use crate::config::DesktopConfig;
use crate::devices::framebuffer::color::Color;
use crate::devices::framebuffer::raster::{Canvas, Image, ImageRef, Painter, Raster};
use crate::devices::framebuffer::surface::DisplaySurface;
use crate::devices::input::events::{Event, EventKind, MouseButtons, MouseData};
use crate::error::GfxError;
use crate::geometry::{Point, Rect};
use crate::ui::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Idle,
    Moving { id: WindowId, offset: Point },
    Resizing { id: WindowId, anchor: Point, start: Rect },
}

struct Slot {
    generation: u32,
    window: Option<Window>,
}

pub struct WindowManager {
    slots: Vec<Slot>,
    /// Bottom to top.
    z_order: Vec<WindowId>,
    focused: Option<WindowId>,
    drag: Drag,
    pointer: Point,
    hover: Option<(WindowId, Button)>,
    damage: Option<Rect>,
    screen: Rect,
    config: DesktopConfig,
    theme: Theme,
    font: &'static MonoFont<'static>,
    wallpaper: Option<Image>,
    /// Timestamp of the event being dispatched; stamps notifications.
    now: u64,
}

impl WindowManager {
    pub fn new(width: usize, height: usize, config: DesktopConfig) -> Self {
        let screen = Rect::new(0, 0, width as u32, height as u32);
        Self {
            slots: Vec::new(),
            z_order: Vec::new(),
            focused: None,
            drag: Drag::Idle,
            pointer: Point::default(),
            hover: None,
            damage: Some(screen),
            screen,
            config,
            theme: Theme::default(),
            font: &FONT_8X13,
            wallpaper: None,
            now: 0,
        }
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.damage_all();
    }

    /// Glyphs for window titles.
    pub fn set_font(&mut self, font: &'static MonoFont<'static>) {
        self.font = font;
        self.damage_all();
    }

    /// Image drawn under all windows, anchored top-left. `None` falls back to
    /// the theme's desktop color.
    pub fn set_wallpaper(&mut self, wallpaper: Option<Image>) {
        self.wallpaper = wallpaper;
        self.damage_all();
    }

    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Follow a resolution change. Maximized windows are refitted.
    pub fn set_screen_size(&mut self, width: usize, height: usize) {
        self.screen = Rect::new(0, 0, width as u32, height as u32);
        let maximized: Vec<WindowId> = self
            .z_order
            .iter()
            .copied()
            .filter(|id| self.window(*id).is_some_and(|w| w.has(WindowFlags::MAXIMIZED)))
            .collect();
        for id in maximized {
            if let Err(e) = self.set_geometry(id, self.maximized_rect()) {
                warn!("wm: refit of {:?} failed: {}", id, e);
            }
        }
        self.damage_all();
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.window.as_ref()
    }

    fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.window.as_mut()
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.window(id).is_some()
    }

    pub fn count(&self) -> usize {
        self.z_order.len()
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    /// Live windows, bottom to top.
    pub fn z_order(&self) -> &[WindowId] {
        &self.z_order
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Window currently being moved or resized by the pointer.
    pub fn dragging(&self) -> Option<WindowId> {
        match self.drag {
            Drag::Idle => None,
            Drag::Moving { id, .. } | Drag::Resizing { id, .. } => Some(id),
        }
    }

    /// Topmost shown window whose outer rectangle contains the point.
    pub fn window_at(&self, x: i32, y: i32) -> Option<WindowId> {
        self.z_order.iter().rev().copied().find(|id| {
            self.window(*id)
                .is_some_and(|w| w.is_shown() && w.rect().contains(x, y))
        })
    }

    fn topmost_shown(&self) -> Option<WindowId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|id| self.window(*id).is_some_and(Window::is_shown))
    }

    fn active_modal(&self) -> Option<WindowId> {
        self.z_order.iter().rev().copied().find(|id| {
            self.window(*id)
                .is_some_and(|w| w.is_shown() && w.has(WindowFlags::MODAL))
        })
    }

    fn maximized_rect(&self) -> Rect {
        Rect::new(
            0,
            0,
            self.screen.w,
            self.screen.h.saturating_sub(self.config.status_bar_height),
        )
    }

    // =========================================================================
    // DAMAGE
    // =========================================================================

    fn damage(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.damage = Some(match self.damage {
            Some(d) => d.union(&rect),
            None => rect,
        });
    }

    fn damage_window(&mut self, id: WindowId) {
        if let Some(r) = self.window(id).map(|w| decor::bounds_with_shadow(w.rect(), &self.config)) {
            self.damage(r);
        }
    }

    pub fn damage_all(&mut self) {
        self.damage = Some(self.screen);
    }

    /// Pending damage, if any.
    pub fn damaged(&self) -> Option<Rect> {
        self.damage
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Create a window. Shown windows are placed on top and focused; hidden
    /// or minimized ones go directly below the focused window.
    pub fn create(
        &mut self,
        title: &str,
        rect: Rect,
        flags: WindowFlags,
        handler: Option<Box<dyn WindowHandler>>,
    ) -> Result<WindowId, GfxError> {
        if self.z_order.len() >= self.config.max_windows {
            warn!("wm: window table full ({})", self.config.max_windows);
            return Err(GfxError::ResourceExhausted);
        }
        // focus is granted below, never taken from the caller's flags
        let flags = flags - WindowFlags::FOCUSED;
        let rect = rect.clamped();
        let client = client_rect(rect, flags, &self.config);
        let background = self.theme.window_background;
        let buffer = alloc_buffer(client.w, client.h, background)?;

        let index = match self.slots.iter().position(|s| s.window.is_none()) {
            Some(i) => i,
            None => {
                self.slots
                    .try_reserve(1)
                    .map_err(|_| GfxError::ResourceExhausted)?;
                self.slots.push(Slot {
                    generation: 0,
                    window: None,
                });
                self.slots.len() - 1
            }
        };
        self.z_order
            .try_reserve(1)
            .map_err(|_| GfxError::ResourceExhausted)?;

        let id = WindowId {
            index: index as u32,
            generation: self.slots[index].generation,
        };
        let window = Window {
            id,
            title: truncated(title),
            rect,
            client,
            flags,
            background,
            buffer,
            dirty: true,
            saved: None,
            handler,
        };
        let shown = window.is_shown();
        self.slots[index].window = Some(window);

        if shown {
            self.z_order.push(id);
            self.focus(id);
        } else {
            let at = self
                .focused
                .and_then(|f| self.z_order.iter().position(|z| *z == f))
                .unwrap_or(self.z_order.len());
            self.z_order.insert(at, id);
        }
        self.damage_window(id);
        info!("wm: created {:?} '{}' at {:?}", id, title, rect);
        Ok(id)
    }

    /// Remove the window and free its buffer. Focus passes to the topmost
    /// shown window, if any.
    pub fn destroy(&mut self, id: WindowId) {
        if !self.contains(id) {
            return;
        }
        self.damage_window(id);
        let slot = &mut self.slots[id.index()];
        slot.window = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.z_order.retain(|z| *z != id);

        if self.dragging() == Some(id) {
            self.drag = Drag::Idle;
        }
        if self.hover.is_some_and(|(h, _)| h == id) {
            self.hover = None;
        }
        debug!("wm: destroyed {:?}", id);

        if self.focused == Some(id) {
            self.focused = None;
            if let Some(next) = self.topmost_shown() {
                self.focus(next);
            }
        }
    }

    pub fn show(&mut self, id: WindowId) {
        self.set_flag(id, WindowFlags::VISIBLE, true);
    }

    pub fn hide(&mut self, id: WindowId) {
        self.set_flag(id, WindowFlags::VISIBLE, false);
    }

    fn set_flag(&mut self, id: WindowId, flag: WindowFlags, on: bool) {
        let Some(win) = self.window_mut(id) else {
            return;
        };
        if win.flags.contains(flag) == on {
            return;
        }
        win.flags.set(flag, on);
        self.damage_window(id);
    }

    // =========================================================================
    // GEOMETRY
    // =========================================================================

    pub fn move_to(&mut self, id: WindowId, x: i32, y: i32) {
        let Some(win) = self.window(id) else {
            return;
        };
        let rect = Rect::new(x, y, win.rect().w, win.rect().h).clamped();
        if rect == win.rect() {
            return;
        }
        let config = self.config;
        self.damage_window(id);
        if let Some(win) = self.window_mut(id) {
            win.client = client_rect(rect, win.flags, &config);
            win.rect = rect;
        }
        self.damage_window(id);
    }

    pub fn resize(&mut self, id: WindowId, w: u32, h: u32) -> Result<(), GfxError> {
        let rect = self.window(id).ok_or(GfxError::InvalidArgument)?.rect();
        self.set_geometry(id, Rect::new(rect.x, rect.y, w, h))
    }

    /// Replace the outer rectangle and reallocate the client buffer. The new
    /// buffer is allocated first; on failure nothing changes.
    fn set_geometry(&mut self, id: WindowId, rect: Rect) -> Result<(), GfxError> {
        let rect = rect.clamped();
        let config = self.config;
        let win = self.window(id).ok_or(GfxError::InvalidArgument)?;
        if win.rect() == rect {
            return Ok(());
        }
        let client = client_rect(rect, win.flags(), &config);
        let buffer = alloc_buffer(client.w, client.h, win.background()).map_err(|e| {
            warn!("wm: no memory for {}x{} client of {:?}", client.w, client.h, id);
            e
        })?;

        self.damage_window(id);
        if let Some(win) = self.window_mut(id) {
            win.rect = rect;
            win.client = client;
            win.buffer = buffer;
            win.dirty = true;
        }
        self.damage_window(id);
        Ok(())
    }

    // =========================================================================
    // FOCUS AND STATE
    // =========================================================================

    /// Give `id` the focus and raise it to the top, notifying the previous
    /// holder (blur) and the new one (focus).
    pub fn focus(&mut self, id: WindowId) {
        if !self.contains(id) {
            return;
        }
        if self.focused == Some(id) && self.z_order.last() == Some(&id) {
            return;
        }

        if let Some(prev) = self.focused.take() {
            if prev != id {
                if let Some(w) = self.window_mut(prev) {
                    w.flags.remove(WindowFlags::FOCUSED);
                }
                self.damage_window(prev);
                self.notify(prev, EventKind::WindowBlur);
            }
        }
        // a blur handler may have destroyed the window we are focusing
        if !self.contains(id) {
            return;
        }

        if let Some(pos) = self.z_order.iter().position(|z| *z == id) {
            self.z_order.remove(pos);
        }
        self.z_order.push(id);
        if let Some(w) = self.window_mut(id) {
            w.flags.insert(WindowFlags::FOCUSED);
        }
        self.focused = Some(id);
        self.damage_window(id);
        debug!("wm: focus {:?}", id);
        self.notify(id, EventKind::WindowFocus);
    }

    fn unfocus(&mut self, id: WindowId) {
        if self.focused != Some(id) {
            return;
        }
        self.focused = None;
        if let Some(w) = self.window_mut(id) {
            w.flags.remove(WindowFlags::FOCUSED);
        }
        self.notify(id, EventKind::WindowBlur);
    }

    pub fn minimize(&mut self, id: WindowId) {
        let Some(win) = self.window_mut(id) else {
            return;
        };
        if win.flags.contains(WindowFlags::MINIMIZED) {
            return;
        }
        win.flags.insert(WindowFlags::MINIMIZED);
        self.damage_window(id);
        if self.dragging() == Some(id) {
            self.drag = Drag::Idle;
        }
        if self.focused == Some(id) {
            self.unfocus(id);
            if let Some(next) = self.topmost_shown() {
                self.focus(next);
            }
        }
    }

    pub fn restore(&mut self, id: WindowId) {
        let Some(win) = self.window_mut(id) else {
            return;
        };
        win.flags.remove(WindowFlags::MINIMIZED);
        self.damage_window(id);
        self.focus(id);
    }

    /// Toggle between the saved rectangle and the whole screen minus the
    /// status bar strip.
    pub fn maximize(&mut self, id: WindowId) -> Result<(), GfxError> {
        let win = self.window(id).ok_or(GfxError::InvalidArgument)?;
        if win.has(WindowFlags::MAXIMIZED) {
            let target = win.saved_rect().unwrap_or(win.rect());
            self.set_geometry(id, target)?;
            if let Some(w) = self.window_mut(id) {
                w.flags.remove(WindowFlags::MAXIMIZED);
                w.saved = None;
            }
        } else {
            let saved = win.rect();
            self.set_geometry(id, self.maximized_rect())?;
            if let Some(w) = self.window_mut(id) {
                w.flags.insert(WindowFlags::MAXIMIZED);
                w.saved = Some(saved);
            }
        }
        self.damage_window(id);
        Ok(())
    }

    // =========================================================================
    // OWNER CONVENIENCES
    // =========================================================================

    pub fn set_title(&mut self, id: WindowId, title: &str) {
        if let Some(w) = self.window_mut(id) {
            w.set_title(title);
            self.damage_window(id);
        }
    }

    /// Windows without a handler are refilled at once; the others repaint
    /// over the new background on the next redraw.
    pub fn set_background(&mut self, id: WindowId, color: Color) {
        let Some(w) = self.window_mut(id) else {
            return;
        };
        w.background = color;
        w.dirty = true;
        if w.handler.is_none() {
            w.buffer.fill(color.to_argb());
            let client = w.client();
            self.damage(client);
        }
    }

    pub fn invalidate(&mut self, id: WindowId) {
        if let Some(w) = self.window_mut(id) {
            w.dirty = true;
        }
    }

    /// Draw into the client buffer outside the paint pass. The client area
    /// is recomposited on the next frame.
    pub fn canvas_mut(&mut self, id: WindowId) -> Option<Canvas<'_>> {
        let client = self.window(id)?.client();
        self.damage(client);
        self.window_mut(id).map(Window::canvas)
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Hand `event` to `id`'s handler and act on its reply.
    fn deliver(&mut self, id: WindowId, event: Event) -> Reply {
        let Some(win) = self.window_mut(id) else {
            return Reply::Ignored;
        };
        let reply = match win.handler.take() {
            Some(mut handler) => {
                let reply = handler.handle(win, &event);
                win.handler = Some(handler);
                reply
            }
            None => default_reply(&event),
        };
        if win.dirty {
            let client = win.client();
            self.damage(client);
        }
        if reply == Reply::Destroy {
            self.destroy(id);
        }
        reply
    }

    fn notify(&mut self, id: WindowId, kind: EventKind) {
        let event = Event::new(kind, self.now).to(id);
        self.deliver(id, event);
    }

    /// Deliver a pointer event to `id` with client-relative coordinates.
    fn deliver_pointer(&mut self, id: WindowId, event: &Event) -> bool {
        let Some(client) = self.window(id).map(Window::client) else {
            return false;
        };
        let mut ev = event.to(id);
        if let Some(m) = ev.mouse_mut() {
            m.x = m.x.saturating_sub(client.x);
            m.y = m.y.saturating_sub(client.y);
        }
        self.deliver(id, ev) != Reply::Ignored
    }

    /// Route one input or window event. Returns whether a window took it.
    pub fn dispatch(&mut self, event: &Event) -> bool {
        self.now = event.timestamp;
        match event.kind {
            EventKind::MouseMove(m) => self.mouse_move(event, &m),
            EventKind::MouseDown(m) => self.mouse_down(event, &m),
            EventKind::MouseUp(m) => self.mouse_up(event, &m),
            EventKind::MouseClick(m) | EventKind::MouseDblClick(m) => {
                match self.focused {
                    Some(id) if self.window(id).is_some_and(|w| w.client().contains(m.x, m.y)) => {
                        self.deliver_pointer(id, event)
                    }
                    _ => false,
                }
            }
            EventKind::KeyDown(_) | EventKind::KeyUp(_) | EventKind::KeyChar(_) => {
                match self.focused {
                    Some(id) => self.deliver(id, event.to(id)) != Reply::Ignored,
                    None => false,
                }
            }
            EventKind::Quit => false,
            _ => match event.window {
                Some(id) if self.contains(id) => self.deliver(id, *event) != Reply::Ignored,
                _ => false,
            },
        }
    }

    fn mouse_move(&mut self, event: &Event, m: &MouseData) -> bool {
        self.pointer = Point::new(m.x, m.y);
        self.update_hover();

        match self.drag {
            Drag::Moving { id, offset } => {
                // keep the title bar reachable
                let y = m.y.saturating_sub(offset.y).max(0);
                self.move_to(id, m.x.saturating_sub(offset.x), y);
                true
            }
            Drag::Resizing { id, anchor, start } => {
                let grow = |from: u32, to: i32, at: i32, min: u32| {
                    (from as i64 + to as i64 - at as i64).clamp(min as i64, u32::MAX as i64) as u32
                };
                let w = grow(start.w, m.x, anchor.x, self.config.min_window_width);
                let h = grow(start.h, m.y, anchor.y, self.config.min_window_height);
                // keep the old size on allocation failure
                let _ = self.set_geometry(id, Rect::new(start.x, start.y, w, h));
                true
            }
            Drag::Idle => match self.focused {
                Some(id) => self.deliver_pointer(id, event),
                None => false,
            },
        }
    }

    fn mouse_down(&mut self, event: &Event, m: &MouseData) -> bool {
        self.pointer = Point::new(m.x, m.y);
        let Some(id) = self.window_at(m.x, m.y) else {
            return false;
        };
        if self.active_modal().is_some_and(|modal| modal != id) {
            return true;
        }
        if self.focused != Some(id) {
            self.focus(id);
        }
        let Some(win) = self.window(id) else {
            return true;
        };

        let hit = decor::hit_test(win, m.x, m.y, &self.config);
        let (rect, flags) = (win.rect(), win.flags());
        if m.button != MouseButtons::LEFT {
            return hit == Hit::Client && self.deliver_pointer(id, event);
        }

        match hit {
            Hit::Button(Button::Close) => {
                self.notify(id, EventKind::WindowClose);
            }
            Hit::Button(Button::Maximize) => {
                if let Err(e) = self.maximize(id) {
                    warn!("wm: maximize {:?} failed: {}", id, e);
                }
            }
            Hit::Button(Button::Minimize) => self.minimize(id),
            Hit::ResizeGrip => {
                debug!("wm: resize {:?} begins", id);
                self.drag = Drag::Resizing {
                    id,
                    anchor: Point::new(m.x, m.y),
                    start: rect,
                };
            }
            Hit::TitleBar => {
                if flags.contains(WindowFlags::MOVABLE) && !flags.contains(WindowFlags::MAXIMIZED) {
                    let origin = rect.origin();
                    debug!("wm: drag {:?} begins", id);
                    self.drag = Drag::Moving {
                        id,
                        offset: Point::new(m.x - origin.x, m.y - origin.y),
                    };
                }
            }
            Hit::Client => {
                self.deliver_pointer(id, event);
            }
            Hit::Frame => {}
        }
        true
    }

    fn mouse_up(&mut self, event: &Event, m: &MouseData) -> bool {
        self.pointer = Point::new(m.x, m.y);
        match core::mem::replace(&mut self.drag, Drag::Idle) {
            Drag::Moving { id, .. } => {
                if let Some(rect) = self.window(id).map(Window::rect) {
                    debug!("wm: drag {:?} ends at {:?}", id, rect);
                    self.notify(id, EventKind::WindowMove(rect));
                }
                true
            }
            Drag::Resizing { id, .. } => {
                if let Some(rect) = self.window(id).map(Window::rect) {
                    debug!("wm: resize {:?} ends at {:?}", id, rect);
                    self.notify(id, EventKind::WindowResize(rect));
                }
                true
            }
            Drag::Idle => match self.focused {
                Some(id) => self.deliver_pointer(id, event),
                None => false,
            },
        }
    }

    fn update_hover(&mut self) {
        let (x, y) = (self.pointer.x, self.pointer.y);
        let hover = self.window_at(x, y).and_then(|id| {
            let win = self.window(id)?;
            match decor::hit_test(win, x, y, &self.config) {
                Hit::Button(b) => Some((id, b)),
                _ => None,
            }
        });
        if hover == self.hover {
            return;
        }
        for (id, _) in [self.hover, hover].into_iter().flatten() {
            if let Some(bar) = self.window(id).map(|w| decor::title_bar(w.rect(), &self.config)) {
                self.damage(bar);
            }
        }
        self.hover = hover;
    }

    // =========================================================================
    // FRAME
    // =========================================================================

    /// Repaint the client buffer of every shown, dirty window that has a
    /// handler. Windows without a usable buffer are skipped.
    pub fn redraw_all(&mut self) {
        let ids: Vec<WindowId> = self.z_order.clone();
        for id in ids {
            let Some(win) = self.window_mut(id) else {
                continue;
            };
            if !win.is_shown() || !win.dirty {
                continue;
            }
            win.dirty = false;
            let client = win.client();
            if win.buffer.is_empty() {
                continue;
            }
            if let Some(mut handler) = win.handler.take() {
                let background = win.background;
                let mut canvas = win.canvas();
                canvas.clear(background);
                handler.paint(&mut canvas);
                win.handler = Some(handler);
            }
            self.damage(client);
        }
    }

    /// Rebuild the damaged region of the backbuffer. Returns false when
    /// nothing was damaged.
    pub fn composite(&mut self, surface: &mut DisplaySurface) -> bool {
        let Some(area) = self.damage.take().and_then(|d| d.intersect(&surface.bounds())) else {
            return false;
        };
        surface.set_clip(area);

        surface.fill_rect(area, self.theme.desktop);
        if let Some(wallpaper) = &self.wallpaper {
            surface.blit(0, 0, wallpaper.view());
        }

        for id in &self.z_order {
            let Some(win) = self.window(*id) else {
                continue;
            };
            if !win.is_shown() {
                continue;
            }
            let bounds = decor::bounds_with_shadow(win.rect(), &self.config);
            let Some(visible) = bounds.intersect(&area) else {
                continue;
            };

            decor::draw_shadow(surface, win.rect(), &self.config);
            if win.has(WindowFlags::DECORATED) {
                let hover = self.hover.filter(|(h, _)| h == id).map(|(_, b)| b);
                decor::draw_frame(surface, win, &self.config, &self.theme, self.font, hover);
            }
            let client = win.client();
            if !win.buffer().is_empty() {
                if let Some(image) = ImageRef::new(client.w, client.h, win.buffer()) {
                    surface.blit(client.x, client.y, image);
                }
            }
            surface.mark_dirty(visible);
        }

        surface.reset_clip();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::framebuffer::surface::tests::surface;
    use alloc::rc::Rc;
    use core::cell::RefCell;

    type Log = Rc<RefCell<Vec<EventKind>>>;

    struct Recorder {
        log: Log,
        veto_close: bool,
        fill: Option<Color>,
    }

    impl WindowHandler for Recorder {
        fn paint(&mut self, canvas: &mut Canvas<'_>) {
            if let Some(c) = self.fill {
                canvas.clear(c);
            }
        }

        fn handle(&mut self, _window: &mut Window, event: &Event) -> Reply {
            self.log.borrow_mut().push(event.kind);
            match event.kind {
                EventKind::WindowClose if self.veto_close => Reply::Consumed,
                EventKind::WindowClose => Reply::Destroy,
                _ => Reply::Consumed,
            }
        }
    }

    fn recorder(log: &Log) -> Option<Box<dyn WindowHandler>> {
        Some(Box::new(Recorder {
            log: log.clone(),
            veto_close: false,
            fill: None,
        }))
    }

    fn wm() -> WindowManager {
        WindowManager::new(640, 480, DesktopConfig::default())
    }

    fn mouse(kind: fn(MouseData) -> EventKind, x: i32, y: i32) -> Event {
        Event::new(
            kind(MouseData {
                x,
                y,
                button: MouseButtons::LEFT,
                ..Default::default()
            }),
            0,
        )
    }

    fn assert_focus_invariant(wm: &WindowManager) {
        let focused: Vec<_> = wm
            .z_order()
            .iter()
            .filter(|id| wm.window(**id).unwrap().is_focused())
            .collect();
        assert!(focused.len() <= 1);
        if let Some(id) = focused.first() {
            assert_eq!(wm.z_order().last(), Some(*id));
            assert_eq!(wm.focused(), Some(**id));
        }
    }

    #[test]
    fn create_focuses_and_raises() {
        let mut wm = wm();
        let a = wm.create("a", Rect::new(0, 0, 100, 100), WindowFlags::DEFAULT, None).unwrap();
        let b = wm.create("b", Rect::new(50, 50, 100, 100), WindowFlags::DEFAULT, None).unwrap();
        assert_eq!(wm.z_order(), &[a, b]);
        assert_eq!(wm.focused(), Some(b));
        assert!(!wm.window(a).unwrap().is_focused());
        assert_focus_invariant(&wm);
    }

    #[test]
    fn hidden_window_goes_below_focus() {
        let mut wm = wm();
        let a = wm.create("a", Rect::new(0, 0, 100, 100), WindowFlags::DEFAULT, None).unwrap();
        let flags = WindowFlags::DEFAULT - WindowFlags::VISIBLE;
        let h = wm.create("h", Rect::new(0, 0, 100, 100), flags, None).unwrap();
        assert_eq!(wm.z_order(), &[h, a]);
        assert_eq!(wm.focused(), Some(a));
        assert_focus_invariant(&wm);
    }

    #[test]
    fn window_table_is_bounded() {
        let mut wm = WindowManager::new(
            64,
            64,
            DesktopConfig {
                max_windows: 2,
                ..DesktopConfig::default()
            },
        );
        let r = Rect::new(0, 0, 10, 10);
        wm.create("1", r, WindowFlags::VISIBLE, None).unwrap();
        wm.create("2", r, WindowFlags::VISIBLE, None).unwrap();
        assert_eq!(
            wm.create("3", r, WindowFlags::VISIBLE, None),
            Err(GfxError::ResourceExhausted)
        );
    }

    #[test]
    fn stale_handles_are_ignored() {
        let mut wm = wm();
        let a = wm.create("a", Rect::new(0, 0, 100, 100), WindowFlags::DEFAULT, None).unwrap();
        wm.destroy(a);
        let b = wm.create("b", Rect::new(0, 0, 100, 100), WindowFlags::DEFAULT, None).unwrap();
        assert_eq!(a.index(), b.index());
        assert!(wm.window(a).is_none());
        wm.move_to(a, 5, 5);
        wm.focus(a);
        assert_eq!(wm.resize(a, 1, 1), Err(GfxError::InvalidArgument));
        assert_eq!(wm.window(b).unwrap().rect(), Rect::new(0, 0, 100, 100));
        assert_eq!(wm.focused(), Some(b));
    }

    #[test]
    fn focus_change_notifies_blur_then_focus() {
        let mut wm = wm();
        let la: Log = Default::default();
        let lb: Log = Default::default();
        let a = wm.create("a", Rect::new(0, 0, 100, 100), WindowFlags::DEFAULT, recorder(&la)).unwrap();
        let _b = wm.create("b", Rect::new(200, 0, 100, 100), WindowFlags::DEFAULT, recorder(&lb)).unwrap();
        la.borrow_mut().clear();
        lb.borrow_mut().clear();
        wm.focus(a);
        assert_eq!(*la.borrow(), [EventKind::WindowFocus]);
        assert_eq!(*lb.borrow(), [EventKind::WindowBlur]);
        assert_focus_invariant(&wm);
    }

    #[test]
    fn destroy_passes_focus_to_topmost_shown() {
        let mut wm = wm();
        let r = Rect::new(0, 0, 100, 100);
        let a = wm.create("a", r, WindowFlags::DEFAULT, None).unwrap();
        let b = wm.create("b", r, WindowFlags::DEFAULT, None).unwrap();
        let c = wm.create("c", r, WindowFlags::DEFAULT, None).unwrap();
        wm.minimize(b);
        assert_eq!(wm.focused(), Some(c));
        wm.destroy(c);
        assert_eq!(wm.focused(), Some(a));
        assert!(wm.window(a).unwrap().is_focused());
        wm.destroy(a);
        assert_eq!(wm.focused(), None);
        assert_eq!(wm.count(), 1);
    }

    #[test]
    fn minimize_and_restore() {
        let mut wm = wm();
        let r = Rect::new(0, 0, 100, 100);
        let a = wm.create("a", r, WindowFlags::DEFAULT, None).unwrap();
        let b = wm.create("b", r, WindowFlags::DEFAULT, None).unwrap();
        wm.minimize(b);
        assert_eq!(wm.focused(), Some(a));
        assert_eq!(wm.window_at(10, 10), Some(a));
        wm.restore(b);
        assert_eq!(wm.focused(), Some(b));
        assert!(!wm.window(b).unwrap().has(WindowFlags::MINIMIZED));
        assert_focus_invariant(&wm);
    }

    #[test]
    fn show_and_hide_only_toggle_visibility() {
        let mut wm = wm();
        let a = wm.create("a", Rect::new(0, 0, 100, 100), WindowFlags::DEFAULT, None).unwrap();
        wm.hide(a);
        assert!(!wm.window(a).unwrap().has(WindowFlags::VISIBLE));
        assert_eq!(wm.window_at(10, 10), None);
        assert_eq!(wm.focused(), Some(a));
        wm.show(a);
        assert_eq!(wm.window_at(10, 10), Some(a));
    }

    #[test]
    fn resize_reallocates_buffer() {
        let mut wm = wm();
        let a = wm.create("a", Rect::new(0, 0, 100, 100), WindowFlags::DEFAULT, None).unwrap();
        wm.resize(a, 150, 80).unwrap();
        let w = wm.window(a).unwrap();
        assert_eq!(w.client(), Rect::new(1, 25, 148, 54));
        assert_eq!(w.buffer().len(), 148 * 54);
    }

    #[test]
    fn maximize_fills_screen_above_status_bar_and_restores() {
        let mut wm = wm();
        let r = Rect::new(33, 44, 120, 90);
        let a = wm.create("a", r, WindowFlags::DEFAULT, None).unwrap();
        wm.maximize(a).unwrap();
        let w = wm.window(a).unwrap();
        assert_eq!(w.rect(), Rect::new(0, 0, 640, 480 - 28));
        assert!(w.has(WindowFlags::MAXIMIZED));
        assert_eq!(w.buffer().len(), (w.client().w * w.client().h) as usize);
        wm.maximize(a).unwrap();
        let w = wm.window(a).unwrap();
        assert_eq!(w.rect(), r);
        assert!(!w.has(WindowFlags::MAXIMIZED));
        assert_eq!(w.saved_rect(), None);
    }

    #[test]
    fn title_drag_moves_and_notifies_once() {
        let mut wm = wm();
        let log: Log = Default::default();
        let a = wm.create("A", Rect::new(10, 10, 200, 150), WindowFlags::DEFAULT, recorder(&log)).unwrap();
        log.borrow_mut().clear();

        wm.dispatch(&mouse(EventKind::MouseDown, 15, 15));
        assert_eq!(wm.dragging(), Some(a));
        wm.dispatch(&mouse(EventKind::MouseMove, 60, 60));
        wm.dispatch(&mouse(EventKind::MouseMove, 115, 115));
        assert_eq!(wm.window(a).unwrap().rect().origin(), Point::new(110, 110));
        assert!(log.borrow().is_empty());
        wm.dispatch(&mouse(EventKind::MouseUp, 115, 115));
        assert_eq!(wm.dragging(), None);
        assert_eq!(*log.borrow(), [EventKind::WindowMove(Rect::new(110, 110, 200, 150))]);
    }

    #[test]
    fn drag_is_clamped_to_top_of_screen() {
        let mut wm = wm();
        let a = wm.create("A", Rect::new(10, 10, 200, 150), WindowFlags::DEFAULT, None).unwrap();
        wm.dispatch(&mouse(EventKind::MouseDown, 20, 15));
        wm.dispatch(&mouse(EventKind::MouseMove, 20, -40));
        assert_eq!(wm.window(a).unwrap().rect().y, 0);
    }

    #[test]
    fn close_button_can_be_vetoed() {
        let mut wm = wm();
        let log: Log = Default::default();
        let handler = Box::new(Recorder {
            log: log.clone(),
            veto_close: true,
            fill: None,
        });
        let a = wm.create("A", Rect::new(10, 10, 200, 150), WindowFlags::DEFAULT, Some(handler)).unwrap();
        wm.dispatch(&mouse(EventKind::MouseDown, 195, 23));
        assert!(wm.contains(a));
        assert!(log.borrow().contains(&EventKind::WindowClose));
        wm.destroy(a);
        assert_eq!(wm.count(), 0);
    }

    #[test]
    fn missing_capability_disables_button() {
        let mut wm = wm();
        let flags = WindowFlags::DEFAULT - WindowFlags::CLOSABLE;
        let a = wm.create("A", Rect::new(10, 10, 200, 150), flags, None).unwrap();
        wm.dispatch(&mouse(EventKind::MouseDown, 195, 23));
        assert!(wm.contains(a));
        assert_eq!(wm.dragging(), None);
    }

    #[test]
    fn client_clicks_are_translated() {
        let mut wm = wm();
        let log: Log = Default::default();
        wm.create("A", Rect::new(10, 10, 200, 150), WindowFlags::DEFAULT, recorder(&log)).unwrap();
        log.borrow_mut().clear();
        wm.dispatch(&mouse(EventKind::MouseDown, 21, 45));
        match log.borrow().as_slice() {
            [EventKind::MouseDown(m)] => assert_eq!((m.x, m.y), (10, 10)),
            other => panic!("unexpected {:?}", other),
        };
    }

    #[test]
    fn grip_resize_respects_minimum() {
        let mut wm = wm();
        let log: Log = Default::default();
        let a = wm.create("A", Rect::new(10, 10, 200, 150), WindowFlags::DEFAULT, recorder(&log)).unwrap();
        log.borrow_mut().clear();
        wm.dispatch(&mouse(EventKind::MouseDown, 205, 155));
        wm.dispatch(&mouse(EventKind::MouseMove, 225, 175));
        assert_eq!(wm.window(a).unwrap().rect(), Rect::new(10, 10, 220, 170));
        wm.dispatch(&mouse(EventKind::MouseMove, 0, 0));
        assert_eq!(wm.window(a).unwrap().rect(), Rect::new(10, 10, 96, 48));
        wm.dispatch(&mouse(EventKind::MouseUp, 0, 0));
        assert_eq!(*log.borrow(), [EventKind::WindowResize(Rect::new(10, 10, 96, 48))]);
    }

    #[test]
    fn modal_swallows_clicks_elsewhere() {
        let mut wm = wm();
        let a = wm.create("a", Rect::new(0, 0, 100, 100), WindowFlags::DEFAULT, None).unwrap();
        let m = wm
            .create("m", Rect::new(300, 300, 100, 100), WindowFlags::DEFAULT | WindowFlags::MODAL, None)
            .unwrap();
        wm.dispatch(&mouse(EventKind::MouseDown, 50, 50));
        assert_eq!(wm.focused(), Some(m));
        wm.destroy(m);
        wm.dispatch(&mouse(EventKind::MouseDown, 50, 50));
        assert_eq!(wm.focused(), Some(a));
    }

    #[test]
    fn keys_go_to_focused_window() {
        use crate::devices::input::events::{KeyCode, KeyData, Modifiers};
        let mut wm = wm();
        let la: Log = Default::default();
        let lb: Log = Default::default();
        wm.create("a", Rect::new(0, 0, 100, 100), WindowFlags::DEFAULT, recorder(&la)).unwrap();
        wm.create("b", Rect::new(0, 0, 100, 100), WindowFlags::DEFAULT, recorder(&lb)).unwrap();
        la.borrow_mut().clear();
        lb.borrow_mut().clear();
        let key = KeyData {
            code: KeyCode(b'x' as u16),
            ch: Some('x'),
            modifiers: Modifiers::empty(),
        };
        assert!(wm.dispatch(&Event::new(EventKind::KeyChar(key), 0)));
        assert!(la.borrow().is_empty());
        assert_eq!(*lb.borrow(), [EventKind::KeyChar(key)]);
    }

    #[test]
    fn redraw_paints_dirty_windows_only() {
        let mut wm = wm();
        let handler = Box::new(Recorder {
            log: Default::default(),
            veto_close: false,
            fill: Some(Color::RED),
        });
        let a = wm.create("a", Rect::new(0, 0, 50, 50), WindowFlags::VISIBLE, Some(handler)).unwrap();
        wm.redraw_all();
        let w = wm.window(a).unwrap();
        assert!(!w.is_dirty());
        assert!(w.buffer().iter().all(|p| *p == Color::RED.to_argb()));
    }

    #[test]
    fn composite_draws_window_and_clears_damage() {
        let mut s = surface(200, 200);
        let mut wm = WindowManager::new(200, 200, DesktopConfig::default());
        let handler = Box::new(Recorder {
            log: Default::default(),
            veto_close: false,
            fill: Some(Color::GREEN),
        });
        let a = wm.create("a", Rect::new(20, 20, 100, 100), WindowFlags::DEFAULT, Some(handler)).unwrap();
        wm.redraw_all();
        assert!(wm.composite(&mut s));
        let client = wm.window(a).unwrap().client();
        assert_eq!(s.get_pixel(client.x + 5, client.y + 5), Some(Color::GREEN));
        assert_eq!(s.get_pixel(5, 5), Some(wm.theme().desktop));
        // shadow darkens the desktop right of the window
        assert_ne!(s.get_pixel(120, 60), Some(wm.theme().desktop));
        assert!(s.dirty_lines().is_set(20));
        assert!(!wm.composite(&mut s));
    }

    #[test]
    fn hover_marks_title_bar_damaged() {
        let mut wm = wm();
        let mut s = surface(640, 480);
        wm.create("a", Rect::new(10, 10, 200, 150), WindowFlags::DEFAULT, None).unwrap();
        wm.composite(&mut s);
        assert_eq!(wm.damaged(), None);
        wm.dispatch(&mouse(EventKind::MouseMove, 195, 23));
        assert!(wm.damaged().is_some_and(|d| d.contains(195, 23)));
    }

    #[test]
    fn unallocatable_create_leaves_table_unchanged() {
        let mut wm = wm();
        let a = wm.create("a", Rect::new(0, 0, 100, 100), WindowFlags::DEFAULT, None).unwrap();
        let huge = Rect::new(0, 0, u32::MAX / 2, u32::MAX / 2);
        assert_eq!(
            wm.create("big", huge, WindowFlags::DEFAULT, None),
            Err(GfxError::ResourceExhausted)
        );
        assert_eq!(wm.count(), 1);
        assert_eq!(wm.z_order(), &[a]);
        assert_eq!(wm.focused(), Some(a));
    }

    #[test]
    fn failed_resize_keeps_geometry_and_buffer() {
        let mut wm = wm();
        let r = Rect::new(5, 5, 100, 100);
        let a = wm.create("a", r, WindowFlags::DEFAULT, None).unwrap();
        let (len, flags) = wm.window(a).map(|w| (w.buffer().len(), w.flags())).unwrap();
        assert_eq!(wm.resize(a, u32::MAX / 2, u32::MAX / 2), Err(GfxError::ResourceExhausted));
        let w = wm.window(a).unwrap();
        assert_eq!(w.rect(), r);
        assert_eq!(w.flags(), flags);
        assert_eq!(w.saved_rect(), None);
        assert_eq!(w.buffer().len(), len);
    }

    #[test]
    fn failed_maximize_keeps_geometry_and_buffer() {
        let mut wm = wm();
        let r = Rect::new(5, 5, 100, 100);
        let a = wm.create("a", r, WindowFlags::DEFAULT, None).unwrap();
        let (len, flags) = wm.window(a).map(|w| (w.buffer().len(), w.flags())).unwrap();
        wm.set_screen_size(1 << 24, 1 << 24);
        assert_eq!(wm.maximize(a), Err(GfxError::ResourceExhausted));
        let w = wm.window(a).unwrap();
        assert_eq!(w.rect(), r);
        assert_eq!(w.flags(), flags);
        assert_eq!(w.saved_rect(), None);
        assert_eq!(w.buffer().len(), len);
    }

    #[test]
    fn composite_skips_empty_client_buffer() {
        let mut s = surface(200, 200);
        let mut wm = WindowManager::new(200, 200, DesktopConfig::default());
        let handler = Box::new(Recorder {
            log: Default::default(),
            veto_close: false,
            fill: Some(Color::GREEN),
        });
        let a = wm.create("a", Rect::new(20, 20, 100, 100), WindowFlags::DEFAULT, Some(handler)).unwrap();
        let empty = wm.create("e", Rect::new(40, 40, 0, 30), WindowFlags::VISIBLE, None).unwrap();
        assert!(wm.window(empty).unwrap().buffer().is_empty());
        wm.redraw_all();
        assert!(wm.composite(&mut s));
        let client = wm.window(a).unwrap().client();
        assert_eq!(s.get_pixel(client.x + 5, client.y + 5), Some(Color::GREEN));
    }

    #[test]
    fn extreme_coordinates_are_clamped() {
        use crate::geometry::COORD_LIMIT;
        let mut wm = wm();
        let mut s = surface(640, 480);
        let a = wm.create("a", Rect::new(10, 10, 200, 150), WindowFlags::DEFAULT, None).unwrap();
        wm.move_to(a, i32::MAX, 0);
        assert_eq!(wm.window(a).unwrap().rect().x, COORD_LIMIT);
        assert!(wm.composite(&mut s));

        wm.move_to(a, 10, 10);
        wm.dispatch(&mouse(EventKind::MouseDown, 15, 15));
        assert_eq!(wm.dragging(), Some(a));
        wm.dispatch(&mouse(EventKind::MouseMove, i32::MIN, i32::MIN));
        assert_eq!(wm.window(a).unwrap().rect().origin(), Point::new(-COORD_LIMIT, 0));
        wm.dispatch(&mouse(EventKind::MouseMove, i32::MAX, i32::MAX));
        assert_eq!(wm.window(a).unwrap().rect().x, COORD_LIMIT);
        wm.dispatch(&mouse(EventKind::MouseUp, i32::MAX, i32::MAX));
        wm.dispatch(&mouse(EventKind::MouseDown, i32::MIN, i32::MIN));
        assert!(wm.composite(&mut s));
    }

    #[test]
    fn set_background_refills_handlerless_window() {
        let mut wm = wm();
        let mut s = surface(640, 480);
        let a = wm.create("a", Rect::new(10, 10, 200, 150), WindowFlags::DEFAULT, None).unwrap();
        wm.composite(&mut s);
        wm.set_background(a, Color::RED);
        let w = wm.window(a).unwrap();
        assert!(w.buffer().iter().all(|p| *p == Color::RED.to_argb()));
        assert_eq!(wm.damaged(), Some(w.client()));
        wm.composite(&mut s);
        let c = wm.window(a).unwrap().client();
        assert_eq!(s.get_pixel(c.x + 3, c.y + 3), Some(Color::RED));
    }
}
