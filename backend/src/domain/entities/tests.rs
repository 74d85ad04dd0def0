//! Coverage for entity documents and keyed field access.

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::SeqRunIdPolicy;
use crate::domain::field::FieldKind;

#[fixture]
fn created() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn project(created: DateTime<Utc>) -> Project {
    let mut project = Project::draft(created);
    project.projectid = "P0".to_owned();
    project
}

#[rstest]
fn document_round_trip_keeps_revision(project: Project) {
    let mut document = to_document(&project).expect("serialisable");
    assert_eq!(document.doctype, Doctype::Project);
    assert_eq!(document.body["_id"], json!(project.meta.id.as_str()));
    assert_eq!(document.body["projectid"], json!("P0"));

    document.rev = Some(crate::domain::Revision::new("1-abc"));
    let parsed: Project = from_document(document).expect("parses back");
    assert_eq!(parsed.projectid, "P0");
    assert_eq!(parsed.meta.rev.as_ref().map(|rev| rev.as_str()), Some("1-abc"));
    assert!(!parsed.meta.is_new());
}

#[rstest]
fn from_document_rejects_other_doctypes(project: Project) {
    let document = to_document(&project).expect("serialisable");
    let err = from_document::<Sample>(document).expect_err("doctype mismatch");
    assert_eq!(err.code(), crate::domain::ErrorCode::InternalError);
}

#[rstest]
fn drafts_inherit_parent_references(project: Project, created: DateTime<Utc>) {
    let mut sample = Sample::draft(&project, created);
    sample.sampleid = "S1".to_owned();
    let mut libprep = LibPrep::draft(&sample, created);
    libprep.libprepid = "A".to_owned();
    let seqrun = SeqRun::draft(&libprep, created);

    assert_eq!(sample.scope(), crate::domain::ports::IndexKey::new(["P0"]));
    assert_eq!(libprep.scope(), crate::domain::ports::IndexKey::new(["P0", "S1"]));
    assert_eq!(
        seqrun.scope(),
        crate::domain::ports::IndexKey::new(["P0", "S1", "A"])
    );
}

#[rstest]
fn empty_identifiers_read_as_unset(created: DateTime<Utc>) {
    let project = Project::draft(created);
    assert_eq!(project.field("projectid"), None);
    assert_eq!(project.field("name"), None);
}

#[rstest]
fn set_field_rejects_mismatched_values(mut project: Project) {
    let err = project
        .set_field("status", Some(FieldValue::Float(1.0)))
        .expect_err("status is text");
    assert_eq!(err.code(), crate::domain::ErrorCode::InternalError);
    assert!(project.set_field("unknown", None).is_err());
}

#[rstest]
fn cleared_measures_read_as_zero(project: Project, created: DateTime<Utc>) {
    let mut sample = Sample::draft(&project, created);
    sample
        .set_field(TOTAL_SEQUENCED_READS, Some(FieldValue::Float(12.0)))
        .expect("float field");
    assert_eq!(sample.total_sequenced_reads, 12.0);
    sample
        .set_field(TOTAL_SEQUENCED_READS, None)
        .expect("clearable");
    assert_eq!(sample.field(TOTAL_SEQUENCED_READS), Some(FieldValue::Float(0.0)));
}

#[rstest]
#[case(
    SeqRunIdPolicy::Position,
    FieldKind::Position {
        index: crate::domain::ports::IndexName::SeqRunId,
    }
)]
#[case(
    SeqRunIdPolicy::RunId,
    FieldKind::Identifier {
        index: crate::domain::ports::IndexName::SeqRunId,
        syntax: crate::domain::field::IdSyntax::RunCode,
    }
)]
fn seqrun_identifier_follows_policy(#[case] policy: SeqRunIdPolicy, #[case] kind: FieldKind) {
    let config = EntityConfig::with_seqrun_id_policy(policy);
    let spec = SeqRun::field_specs(&config)
        .iter()
        .find(|spec| spec.key == "seqrunid")
        .expect("seqrunid declared");
    assert_eq!(spec.kind, kind);
    assert!(!spec.editable);
}

#[rstest]
fn user_status_and_role_parse_from_fields(created: DateTime<Utc>) {
    let mut user = User::draft(created);
    assert_eq!(user.status, UserStatus::Pending);
    user.set_field("status", Some(FieldValue::Text("active".to_owned())))
        .expect("known status");
    user.set_field("role", Some(FieldValue::Text("admin".to_owned())))
        .expect("known role");
    assert!(user.is_active());
    assert_eq!(user.role, UserRole::Admin);
    assert!(
        user.set_field("status", Some(FieldValue::Text("gone".to_owned())))
            .is_err()
    );
}

#[rstest]
fn log_entries_reference_their_owner(project: Project, created: DateTime<Utc>) {
    let changed = std::collections::BTreeMap::from([("projectid".to_owned(), json!("P0"))]);
    let entry = LogEntry::new(&project.meta, changed, Default::default(), None, created);
    let document = to_document(&entry).expect("serialisable");
    assert_eq!(document.doctype, Doctype::Log);
    assert_eq!(document.body["doc"], json!(project.meta.id.as_str()));
    assert_eq!(document.body["owner_doctype"], json!("project"));
    assert!(document.body.get("deleted").is_none());
}
