//! Service-level coverage: rollups, listings, logs and policies.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::{
    DocumentStoreError, IndexRow, KeyRange, MockDocumentStore,
};
use crate::domain::Revision;
use crate::outbound::persistence::MemoryDocumentStore;
use crate::domain::ports::UserAccountsCommand;
use crate::domain::{Doctype, ErrorCode, SeqRunIdPolicy, UserAccountsService};
use crate::test_support::Harness;

struct Fixture {
    harness: Harness,
    service: TrackingService,
}

impl Fixture {
    fn new(config: EntityConfig) -> Self {
        let harness = Harness::new(config);
        let service = TrackingService::new(harness.store.clone(), config, harness.clock.clone());
        Self { harness, service }
    }

    async fn seed(&self) -> LibPrepPath {
        let project = ProjectPath::new("P0");
        self.service
            .create_project(request(json!({"projectid": "P0"})))
            .await
            .expect("project");
        self.service
            .create_sample(&project, request(json!({"sampleid": "S1"})))
            .await
            .expect("sample");
        let sample = project.sample("S1");
        self.service
            .create_libprep(&sample, request(json!({"libprepid": "A"})))
            .await
            .expect("libprep");
        sample.libprep("A")
    }

    async fn reads(&self) -> f64 {
        self.service
            .sample(&ProjectPath::new("P0").sample("S1"))
            .await
            .expect("sample")
            .total_sequenced_reads
    }
}

fn request(body: serde_json::Value) -> SaveRequest {
    let serde_json::Value::Object(fields) = body else {
        panic!("payload must be an object, got {body}");
    };
    SaveRequest::new(Some(Operator::new("per@example.org")), fields)
}

#[fixture]
fn fixture() -> Fixture {
    Fixture::new(EntityConfig::default())
}

#[rstest]
#[tokio::test]
async fn seqrun_writes_roll_up_into_the_sample(fixture: Fixture) {
    let libprep = fixture.seed().await;
    assert_eq!(fixture.reads().await, 0.0);

    let first = fixture
        .service
        .create_seqrun(&libprep, request(json!({"total_reads": 100})))
        .await
        .expect("first seqrun");
    assert_eq!(first.seqrunid, "1");
    assert_eq!(fixture.reads().await, 100.0);

    fixture
        .service
        .create_seqrun(&libprep, request(json!({"total_reads": 50, "mean_autosomal_coverage": 12.5})))
        .await
        .expect("second seqrun");
    assert_eq!(fixture.reads().await, 150.0);

    fixture
        .service
        .update_seqrun(&libprep.seqrun("1"), request(json!({"total_reads": null})))
        .await
        .expect("cleared reads");
    assert_eq!(fixture.reads().await, 50.0);

    fixture
        .service
        .delete_seqrun(&libprep.seqrun("2"))
        .await
        .expect("deleted");
    let sample = fixture
        .service
        .sample(&ProjectPath::new("P0").sample("S1"))
        .await
        .expect("sample");
    assert_eq!(sample.total_sequenced_reads, 0.0);
    assert_eq!(sample.total_autosomal_coverage, 0.0);
}

#[rstest]
#[tokio::test]
async fn deleting_a_libprep_rerolls_the_sample(fixture: Fixture) {
    let libprep = fixture.seed().await;
    fixture
        .service
        .create_seqrun(&libprep, request(json!({"total_reads": 100})))
        .await
        .expect("seqrun");

    let report = fixture
        .service
        .delete_libprep(&libprep)
        .await
        .expect("deleted");

    assert_eq!(report.documents, 2);
    assert_eq!(fixture.reads().await, 0.0);
}

#[rstest]
#[tokio::test]
async fn unchanged_seqrun_update_leaves_no_trace(fixture: Fixture) {
    let libprep = fixture.seed().await;
    fixture
        .service
        .create_seqrun(&libprep, request(json!({"total_reads": 100})))
        .await
        .expect("seqrun");
    let logs = fixture.harness.store.count(Doctype::Log);

    fixture
        .service
        .update_seqrun(&libprep.seqrun("1"), request(json!({"total_reads": 100.0})))
        .await
        .expect("same value");

    assert_eq!(fixture.harness.store.count(Doctype::Log), logs);
}

#[rstest]
#[tokio::test]
async fn listings_follow_the_hierarchy(fixture: Fixture) {
    let libprep = fixture.seed().await;
    fixture
        .service
        .create_sample(&ProjectPath::new("P0"), request(json!({"sampleid": "S0"})))
        .await
        .expect("second sample");
    fixture
        .service
        .create_seqrun(&libprep, request(json!({})))
        .await
        .expect("seqrun");

    let projects = fixture.service.projects().await.expect("projects");
    assert_eq!(projects.len(), 1);
    let samples = fixture
        .service
        .samples(&ProjectPath::new("P0"))
        .await
        .expect("samples");
    let ids: Vec<_> = samples.iter().map(|sample| sample.sampleid.as_str()).collect();
    assert_eq!(ids, ["S0", "S1"]);

    let libpreps = fixture
        .service
        .libpreps(&LibPrepScope {
            projectid: "P0".to_owned(),
            sampleid: Some("S0".to_owned()),
        })
        .await
        .expect("libpreps of S0");
    assert!(libpreps.is_empty());

    let seqruns = fixture
        .service
        .seqruns(&SeqRunScope {
            projectid: "P0".to_owned(),
            sampleid: None,
            libprepid: None,
        })
        .await
        .expect("seqruns of P0");
    assert_eq!(seqruns.len(), 1);

    let err = fixture
        .service
        .samples(&ProjectPath::new("P9"))
        .await
        .expect_err("unknown project");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn logs_come_back_newest_first(fixture: Fixture) {
    fixture.seed().await;
    fixture.harness.clock.advance_seconds(60);
    let path = ProjectPath::new("P0");
    fixture
        .service
        .update_project(&path, request(json!({"status": "CLOSED"})))
        .await
        .expect("closed");
    let project = fixture.service.project(&path).await.expect("project");

    let logs = fixture.service.logs(&project.meta.id).await.expect("logs");

    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].changed.get("status"), Some(&json!("CLOSED")));
    assert!(logs[0].timestamp > logs[1].timestamp);
    assert_eq!(logs[1].changed.get("projectid"), Some(&json!("P0")));
}

#[rstest]
#[tokio::test]
async fn runid_policy_takes_client_identifiers() {
    let fixture = Fixture::new(EntityConfig::with_seqrun_id_policy(SeqRunIdPolicy::RunId));
    let libprep = fixture.seed().await;

    let missing = fixture
        .service
        .create_seqrun(&libprep, request(json!({"total_reads": 5})))
        .await
        .expect_err("seqrunid required");
    assert_eq!(missing.field(), Some("seqrunid"));

    let seqrun = fixture
        .service
        .create_seqrun(&libprep, request(json!({"seqrunid": "140702_D00415_0052_AC41A2ANXX"})))
        .await
        .expect("run id accepted");
    assert_eq!(seqrun.seqrunid, "140702_D00415_0052_AC41A2ANXX");

    let duplicate = fixture
        .service
        .create_seqrun(&libprep, request(json!({"seqrunid": "140702_D00415_0052_AC41A2ANXX"})))
        .await
        .expect_err("duplicate run id");
    assert_eq!(duplicate.field(), Some("seqrunid"));
}

#[rstest]
#[tokio::test]
async fn store_outages_surface_as_unavailable() {
    let mut store = MockDocumentStore::new();
    store
        .expect_range_query()
        .returning(|_, _| Err(DocumentStoreError::connection("connection refused")));
    let service = TrackingService::new(
        Arc::new(store),
        EntityConfig::default(),
        Arc::new(DefaultClock),
    );

    let err = service
        .project(&ProjectPath::new("P0"))
        .await
        .expect_err("store down");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn documents_come_back_as_stored(fixture: Fixture) {
    fixture.seed().await;
    let project = fixture
        .service
        .project(&ProjectPath::new("P0"))
        .await
        .expect("project");

    let body = fixture
        .service
        .document(&project.meta.id)
        .await
        .expect("stored body");

    assert_eq!(body.get("_id"), Some(&json!(project.meta.id.as_str())));
    assert_eq!(
        body.get("_rev"),
        project.meta.rev.as_ref().map(|rev| json!(rev.as_str())).as_ref()
    );
    assert_eq!(body.get("doctype"), Some(&json!("project")));
    assert_eq!(body.get("projectid"), Some(&json!("P0")));
}

#[rstest]
#[tokio::test]
async fn account_documents_hide_the_api_token(fixture: Fixture) {
    let accounts = UserAccountsService::new(
        fixture.harness.store.clone(),
        fixture.harness.clock.clone(),
    );
    accounts
        .register(request(json!({"email": "per@example.org"})))
        .await
        .expect("registered");
    let user = accounts
        .issue_api_token("per@example.org", None)
        .await
        .expect("token issued");
    assert!(user.api_token.is_some());

    let body = fixture
        .service
        .document(&user.meta.id)
        .await
        .expect("stored body");

    assert_eq!(body.get("email"), Some(&json!("per@example.org")));
    assert_eq!(body.get("doctype"), Some(&json!("user")));
    assert!(body.get(API_TOKEN).is_none());
}

#[rstest]
#[tokio::test]
async fn unknown_documents_are_not_found(fixture: Fixture) {
    let err = fixture
        .service
        .document(&DocId::generate())
        .await
        .expect_err("nothing stored");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Sample,
    LibPrep,
    SeqRun,
}

/// `[projectid, sampleid, libprepid, seqrunid]` and the status after an update.
type Snapshot = ([String; 4], Option<String>);

async fn update_and_read(
    fixture: &Fixture,
    libprep: &LibPrepPath,
    seqrunid: &str,
    target: Target,
    body: serde_json::Value,
) -> Snapshot {
    let sample = ProjectPath::new("P0").sample("S1");
    let seqrun = libprep.seqrun(seqrunid);
    match target {
        Target::Sample => {
            fixture
                .service
                .update_sample(&sample, request(body))
                .await
                .expect("sample updated");
            let stored = fixture.service.sample(&sample).await.expect("sample");
            (
                [stored.projectid, stored.sampleid, String::new(), String::new()],
                stored.status,
            )
        }
        Target::LibPrep => {
            fixture
                .service
                .update_libprep(libprep, request(body))
                .await
                .expect("libprep updated");
            let stored = fixture.service.libprep(libprep).await.expect("libprep");
            (
                [stored.projectid, stored.sampleid, stored.libprepid, String::new()],
                stored.status,
            )
        }
        Target::SeqRun => {
            fixture
                .service
                .update_seqrun(&seqrun, request(body))
                .await
                .expect("seqrun updated");
            let stored = fixture.service.seqrun(&seqrun).await.expect("seqrun");
            (
                [stored.projectid, stored.sampleid, stored.libprepid, stored.seqrunid],
                stored.sequencing_status,
            )
        }
    }
}

#[rstest]
#[case::sample_chain(
    SeqRunIdPolicy::Position,
    Target::Sample,
    json!({"projectid": "P1", "sampleid": "S9", "status": "DONE"})
)]
#[case::libprep_chain(
    SeqRunIdPolicy::Position,
    Target::LibPrep,
    json!({"projectid": "P1", "sampleid": "S9", "libprepid": "B", "status": "DONE"})
)]
#[case::seqrun_position(
    SeqRunIdPolicy::Position,
    Target::SeqRun,
    json!({
        "projectid": "P1",
        "sampleid": "S9",
        "libprepid": "B",
        "seqrunid": "77",
        "sequencing_status": "DONE",
    })
)]
#[case::seqrun_runid(
    SeqRunIdPolicy::RunId,
    Target::SeqRun,
    json!({
        "projectid": "P1",
        "sampleid": "S9",
        "libprepid": "B",
        "seqrunid": "150101_D00415_0099_BC00000XX",
        "sequencing_status": "DONE",
    })
)]
#[tokio::test]
async fn updates_keep_identifiers_and_back_references(
    #[case] policy: SeqRunIdPolicy,
    #[case] target: Target,
    #[case] body: serde_json::Value,
) {
    let fixture = Fixture::new(EntityConfig::with_seqrun_id_policy(policy));
    let libprep = fixture.seed().await;
    let created = fixture
        .service
        .create_seqrun(&libprep, request(json!({"seqrunid": "140702_D00415_0052_AC41A2ANXX"})))
        .await
        .expect("seqrun");
    let seqrunid = created.seqrunid;

    let (ids, status) = update_and_read(&fixture, &libprep, &seqrunid, target, body).await;

    let expected: [&str; 4] = match target {
        Target::Sample => ["P0", "S1", "", ""],
        Target::LibPrep => ["P0", "S1", "A", ""],
        Target::SeqRun => ["P0", "S1", "A", seqrunid.as_str()],
    };
    assert_eq!(ids, expected);
    assert_eq!(status.as_deref(), Some("DONE"));
    match policy {
        SeqRunIdPolicy::Position => assert_eq!(seqrunid, "1"),
        SeqRunIdPolicy::RunId => assert_eq!(seqrunid, "140702_D00415_0052_AC41A2ANXX"),
    }
}

/// Store whose sample saves lose the revision race once armed.
struct ContendedSamples {
    inner: Arc<MemoryDocumentStore>,
    armed: AtomicBool,
}

#[async_trait]
impl DocumentStore for ContendedSamples {
    async fn get(&self, id: &DocId) -> Result<Document, DocumentStoreError> {
        self.inner.get(id).await
    }

    async fn save(&self, document: &Document) -> Result<Revision, DocumentStoreError> {
        if document.doctype == Doctype::Sample && self.armed.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::revision_conflict(document.id.as_str()));
        }
        self.inner.save(document).await
    }

    async fn delete(&self, id: &DocId) -> Result<(), DocumentStoreError> {
        self.inner.delete(id).await
    }

    async fn range_query(
        &self,
        index: IndexName,
        range: &KeyRange,
    ) -> Result<Vec<IndexRow>, DocumentStoreError> {
        self.inner.range_query(index, range).await
    }
}

#[rstest]
#[tokio::test]
async fn rollup_conflict_reports_after_the_seqrun_is_stored(fixture: Fixture) {
    let libprep = fixture.seed().await;
    let store = Arc::new(ContendedSamples {
        inner: fixture.harness.store.clone(),
        armed: AtomicBool::new(true),
    });
    let contended = TrackingService::new(
        store,
        EntityConfig::default(),
        fixture.harness.clock.clone(),
    );

    let err = contended
        .create_seqrun(&libprep, request(json!({"total_reads": 10})))
        .await
        .expect_err("rollup loses the race");
    assert_eq!(err.code(), ErrorCode::Conflict);

    let stored = fixture
        .service
        .seqruns(&SeqRunScope {
            projectid: "P0".to_owned(),
            sampleid: Some("S1".to_owned()),
            libprepid: Some("A".to_owned()),
        })
        .await
        .expect("listing");
    assert_eq!(stored.len(), 1, "the seqrun committed before the rollup");
    assert_eq!(fixture.reads().await, 0.0);
}
