//! Repository methods on [`OmService`](crate::service::OmService), one module per entity.
//!
//! Child entities are always addressed together with the project they are
//! reached through. An id that exists but hangs under another project is
//! reported as not found.

pub mod challenge;
pub mod marker;
pub mod partner;
pub mod project;
pub mod strategy;
pub mod user;
