//! Repository modules for GearGuard entities.
//!
//! Each module adds methods to `GearService` via `impl GearService` blocks.
//! Methods named `find_*` return storage results; `get_*` wrap them with the
//! lifecycle's not-found error.

pub mod assignment;
pub mod audit;
pub mod directory;
pub mod request;
