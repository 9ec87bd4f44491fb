//! Overlay window control and the read side of the overlay.
//!
//! [`OverlayService`] forwards show/hide and background-service commands to
//! the native modules and tracks what it believes their state to be.
//! [`compose_overlay`] turns settings and the latest snapshot into the rows
//! an overlay renderer would draw.

mod compose;
mod service;

pub use compose::{compose_overlay, OverlayFrame, OverlayRow};
pub use service::{OverlayService, OverlayStatus};
