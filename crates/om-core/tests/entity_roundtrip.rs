//! Serde roundtrip and JsonSchema validation tests for the wire entities.

use chrono::Utc;
use schemars::schema_for;
use om_core::entities::*;
use om_core::responses::{Envelope, Response, Status};

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn sample_partner() -> BoundaryPartner {
    BoundaryPartner {
        boundary_partner_id: "bpt-a3f8b2c1".into(),
        project_id: "prj-00c0ffee".into(),
        partner_name: "District health office".into(),
        outcome_statement: "Office budgets for community health workers".into(),
        progress_markers: vec![ProgressMarker {
            progress_marker_id: "pmk-11111111".into(),
            boundary_partner_id: "bpt-a3f8b2c1".into(),
            title: "Attends quarterly review".into(),
            kind: 1,
            order_number: 1,
            challenges: vec![Challenge {
                challenge_id: "chl-22222222".into(),
                progress_marker_id: "pmk-11111111".into(),
                challenge_name: "Staff turnover".into(),
            }],
            strategies: vec![Strategy {
                strategy_id: "stg-33333333".into(),
                progress_marker_id: "pmk-11111111".into(),
                strategy_name: "Share meeting minutes".into(),
            }],
        }],
    }
}

roundtrip_and_validate!(partner_roundtrip, BoundaryPartner, sample_partner());

roundtrip_and_validate!(
    user_roundtrip,
    User,
    User {
        user_id: "usr-0a0b0c0d".into(),
        organization_id: "org-1".into(),
        full_name: "Ada Admin".into(),
        is_admin: true,
    }
);

roundtrip_and_validate!(
    project_roundtrip,
    Project,
    Project {
        project_id: "prj-00c0ffee".into(),
        project_name: "Clean water".into(),
        logo_url: None,
        description: "Rural water access".into(),
        budget: 125_000.5,
        donor: "Foundation".into(),
        vision: "Everyone has water".into(),
        mission: "Build wells".into(),
        timeline_from: Some(Utc::now()),
        timeline_to: None,
        boundary_partner_ids: vec!["bpt-a3f8b2c1".into()],
        boundary_partner_names: vec!["District health office".into()],
    }
);

roundtrip_and_validate!(
    new_project_roundtrip,
    NewProject,
    NewProject {
        project_name: "Clean water".into(),
        budget: 10.0,
        ..Default::default()
    }
);

roundtrip_and_validate!(
    envelope_roundtrip,
    Envelope<BoundaryPartner>,
    Envelope::success(sample_partner())
);

roundtrip_and_validate!(
    response_failure_roundtrip,
    Response<String>,
    Response::failure(Status::NotFound, "boundary partner not found")
);

#[test]
fn marker_kind_serializes_as_type() {
    let json = serde_json::to_value(sample_partner()).unwrap();
    let marker = &json["progress_markers"][0];
    assert_eq!(marker["type"], 1);
    assert!(marker.get("kind").is_none());
    assert_eq!(marker["order_number"], 1);
}

#[test]
fn new_project_defaults_optional_fields() {
    let parsed: NewProject = serde_json::from_str(r#"{"project_name": "Only a name"}"#).unwrap();
    assert_eq!(parsed.project_name, "Only a name");
    assert!(parsed.description.is_empty());
    assert!(parsed.budget.abs() < f64::EPSILON);
}
