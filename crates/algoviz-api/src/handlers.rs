//! Request handlers.

pub mod analysis;
pub mod animation;
pub mod cleanup;
pub mod health;

pub use analysis::*;
pub use animation::*;
pub use cleanup::*;
pub use health::*;
