//! Cache key namespace.
//!
//! - `<resource>:<id>` holds the response shape of a single record, no TTL;
//! - `<resource>:<relation>:<foreign id>` holds a JSON array of records selected by a foreign key, fixed TTL;
//! - `dashboard:<view>` holds an aggregate view, fixed TTL.

use std::fmt::Display;

pub const DASHBOARD_BY_STATE: &str = "dashboard:byState";
pub const DASHBOARD_BY_CULTURE: &str = "dashboard:byCulture";
pub const DASHBOARD_BY_LAND_USE: &str = "dashboard:byLandUse";

#[inline]
pub fn record(resource: &str, id: impl Display) -> String {
    format!("{resource}:{id}")
}

#[inline]
pub fn relation(resource: &str, relation: &str, foreign_id: impl Display) -> String {
    format!("{resource}:{relation}:{foreign_id}")
}

/// Glob covering every key of a resource, both per-record and secondary.
#[inline]
pub fn resource_pattern(resource: &str) -> String {
    format!("{resource}:*")
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn key_shapes() {
        let id = Uuid::nil();
        assert_eq!(record("farm", id), "farm:00000000-0000-0000-0000-000000000000");
        assert_eq!(relation("crop", "farm", 7), "crop:farm:7");
        assert_eq!(resource_pattern("planted"), "planted:*");
    }
}
