//! Terminal input: raw event collection and key bindings.

pub mod raw;
pub mod service;

pub use raw::ScrollDirection;
pub use service::{spawn_input_thread, InputAction, InputService, KeyMap};
