//! Rendering subsystem.
//!
//! Surfaces hold each channel's text, paint routines fill new surfaces, the
//! coordinator ties a channel to its surface, and `ui` draws the foreground surface
//! to the terminal.

pub mod coordinator;
pub mod paint;
pub mod surface;
pub mod ui;

pub use coordinator::RenderCoordinator;
pub use surface::{SurfaceHost, ViewStack, ViewSurface};
