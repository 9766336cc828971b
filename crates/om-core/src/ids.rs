//! ID prefix constants.
//!
//! IDs are generated by the store as `{prefix}-{8 hex chars}`, e.g. `pmk-a3f8b2c1`.

pub const PREFIX_USER: &str = "usr";
pub const PREFIX_PROJECT: &str = "prj";
pub const PREFIX_PARTNER: &str = "bpt";
pub const PREFIX_MARKER: &str = "pmk";
pub const PREFIX_CHALLENGE: &str = "chl";
pub const PREFIX_STRATEGY: &str = "stg";

/// Every prefix in use, for exhaustive tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_USER,
    PREFIX_PROJECT,
    PREFIX_PARTNER,
    PREFIX_MARKER,
    PREFIX_CHALLENGE,
    PREFIX_STRATEGY,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn prefixes_are_unique_and_short() {
        let unique: HashSet<_> = ALL_PREFIXES.iter().collect();
        assert_eq!(unique.len(), ALL_PREFIXES.len());
        assert!(ALL_PREFIXES.iter().all(|p| p.len() == 3));
    }
}
