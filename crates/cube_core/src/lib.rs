//! GPU-free building blocks shared by the demo: logging, keyboard state and
//! frame timing.

pub mod input;
pub mod logging;
pub mod time;
