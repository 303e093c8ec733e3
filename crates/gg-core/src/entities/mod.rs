//! Entity structs for all GearGuard domain objects.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON output.

mod assignment;
mod audit;
mod directory;
mod request;

pub use assignment::{Assignment, AssignmentReceipt};
pub use audit::{AuditEntry, AuditEvent};
pub use directory::{Equipment, Team, User};
pub use request::{MaintenanceRequest, NewRequest, RequestUpdate, RequestView};
