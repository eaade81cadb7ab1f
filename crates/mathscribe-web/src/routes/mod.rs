//! Route handlers.

pub mod calculate;
pub mod health;
