//! # om-core
//!
//! Core types for the outcome mapping service.
//!
//! This crate provides the foundational types shared across all `om-*` crates:
//! - Entity structs for the project hierarchy (projects, boundary partners,
//!   progress markers, challenges, strategies) and users
//! - ID prefix constants
//! - Cross-cutting error types
//! - The `{data, message}` response envelope
//! - Tree assembly of flattened join rows into a nested boundary partner
//! - Dense ordinal planning for progress marker moves, appends and removals
//!
//! Nothing in here performs I/O.

pub mod assembly;
pub mod entities;
pub mod errors;
pub mod ids;
pub mod responses;
pub mod sequencer;
