//! Entity structs for the outcome mapping hierarchy.
//!
//! Each entity maps to a table in the libSQL database (see `om-db` migrations).
//! JSON field names follow the service's wire format, so `ProgressMarker::kind`
//! serializes as `"type"`.

mod partner;
mod project;
mod user;

pub use partner::{BoundaryPartner, Challenge, ProgressMarker, Strategy};
pub use project::{NewProject, Project};
pub use user::User;
