//! # gg-core
//!
//! Core types for the GearGuard maintenance lifecycle.
//!
//! This crate provides the foundational types shared across all GearGuard crates:
//! - Entity structs for requests, assignments, users, teams, equipment, audit entries
//! - Status enums with state machine transitions
//! - The status transition validator
//! - The SLA clock (derived, never stored)
//! - ID prefix constants
//! - Audit detail sub-types
//! - Cross-cutting error types

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod sla;
pub mod transition;
