//! # Input Module
//!
//! Turns raw driver state into an ordered queue of typed events.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │   Keyboard   │    │    Mouse     │    │    Timer     │
//! │   Driver     │    │   Driver     │    │    ticks     │
//! └──────┬───────┘    └──────┬───────┘    └──────┬───────┘
//!        └───────────────────┼───────────────────┘
//!                            ▼  InputDevices (sampled)
//! ┌──────────────────────────────────────────────────────┐
//! │                     EventSystem                      │
//! │  edge detection · click / double-click · key split   │
//! └──────────────────────────┬───────────────────────────┘
//!                            ▼
//! ┌──────────────────────────────────────────────────────┐
//! │          EventQueue (bounded FIFO, drops on full)    │
//! └──────────────────────────┬───────────────────────────┘
//!                            ▼
//!                  poll / wait / peek / push
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! while let Some(event) = events.poll() {
//!     wm.dispatch(&event);
//! }
//! ```

pub mod events;
pub mod queue;
pub mod source;
pub mod system;

pub use events::*;
pub use queue::EventQueue;
pub use source::{InputDevices, MouseSnapshot};
pub use system::EventSystem;
