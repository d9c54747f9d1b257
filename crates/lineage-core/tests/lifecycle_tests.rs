//! End-to-end lifecycle tests over in-memory collaborators.

use lineage_core::{
    CloudFile, DeclaredInput, Job, JobId, MemoryGraphStore, ProvenanceService, ProvenanceState,
    StagedFile,
};
use lineage_record::{GraphCodec, TurtleCodec, DESCRIPTOR_FILE_NAME};
use lineage_test_utils::{
    completion_listing, sample_identity, scenario_job, setup_service, FlakyGraphStore,
    RecordingDispatcher,
};
use pretty_assertions::assert_eq;
use url::Url;

fn uri(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn parse(text: &str, activity: &str) -> lineage_record::ProvenanceGraph {
    TurtleCodec::new().parse(text, &uri(activity)).unwrap()
}

const SCENARIO_ACTIVITY: &str = "http://host/secure/getJobObject.do?jobId=1";

#[tokio::test]
async fn reference_scenario_end_to_end() {
    let (service, dispatcher) = setup_service();
    let job = scenario_job();

    // Phase 1
    let phase1 = service.record_start(&job, None).await.unwrap();
    let started = parse(&phase1, SCENARIO_ACTIVITY);
    assert_eq!(started.activity().uri().as_str(), SCENARIO_ACTIVITY);
    assert_eq!(started.activity().used.len(), 1);
    assert!(started
        .activity()
        .used
        .contains_uri(&uri("http://src/file1")));
    assert!(!started.activity().is_finalized());

    // Phase 2
    let phase2 = service
        .record_completion(&job, &completion_listing())
        .await
        .unwrap();
    let finalized = parse(&phase2, SCENARIO_ACTIVITY);

    assert!(finalized.activity().is_finalized());
    assert_eq!(finalized.activity().generated.len(), 1);
    assert!(finalized
        .activity()
        .generated
        .contains_uri(&uri("http://host/secure/jobFile.do?jobId=1&key=output.png")));
    // One declared input + one output: exactly two entities in the record.
    assert_eq!(finalized.entity_count(), 2);

    // Report went out once, to the configured registry.
    let submissions = dispatcher.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].0.as_str(), "http://registry/reports");
    assert_eq!(submissions[0].1.job_name, "Cool Job");
}

#[tokio::test]
async fn activity_uri_is_identical_across_phases() {
    let (service, _dispatcher) = setup_service();
    let job = scenario_job();

    let phase1 = service.record_start(&job, None).await.unwrap();
    let phase2 = service
        .record_completion(&job, &completion_listing())
        .await
        .unwrap();

    let a = parse(&phase1, SCENARIO_ACTIVITY);
    let b = parse(&phase2, SCENARIO_ACTIVITY);
    assert_eq!(a.activity().uri(), b.activity().uri());
}

#[tokio::test]
async fn used_entity_never_reported_generated() {
    // A declared input whose source URL happens to be the same URI the
    // classifier would mint for a stored file. If it shows up again in the
    // completion listing under an undeclared name, it must stay out of the
    // generated set.
    let minted = "http://host/secure/jobFile.do?jobId=7&key=data.bin";
    let job = Job::new(JobId::new(7), "collision job")
        .with_declared_input(DeclaredInput::new(minted, "declared.bin"))
        .with_completed_at(lineage_test_utils::fixed_completion_time());

    let (service, _dispatcher) = setup_service();
    service.record_start(&job, None).await.unwrap();

    let listing = vec![
        CloudFile::new(DESCRIPTOR_FILE_NAME, DESCRIPTOR_FILE_NAME, 1),
        CloudFile::new("data.bin", "data.bin", 1),
    ];
    let text = service.record_completion(&job, &listing).await.unwrap();

    let graph = parse(&text, "http://host/secure/getJobObject.do?jobId=7");
    assert!(graph.activity().used.contains_uri(&uri(minted)));
    assert!(graph.activity().generated.is_empty());
}

#[tokio::test]
async fn staged_upload_under_prefixed_key_is_never_generated() {
    // The backend lists a staged upload under a job-prefixed storage key, so
    // its candidate URI would differ from the used-entity URI minted at
    // start. Exclusion is by name, not by URI.
    let job = Job::new(JobId::new(1), "staged job")
        .with_staged_file(StagedFile::new("notes.txt"))
        .with_completed_at(lineage_test_utils::fixed_completion_time());

    let (service, _dispatcher) = setup_service();
    service.record_start(&job, None).await.unwrap();

    let listing = vec![
        CloudFile::new(DESCRIPTOR_FILE_NAME, DESCRIPTOR_FILE_NAME, 1),
        CloudFile::new("notes.txt", "job-0000000001/notes.txt", 9),
    ];
    let text = service.record_completion(&job, &listing).await.unwrap();

    let graph = parse(&text, SCENARIO_ACTIVITY);
    assert!(graph.activity().generated.is_empty());
    assert!(graph
        .activity()
        .used
        .contains_uri(&uri("http://host/secure/jobFile.do?jobId=1&key=notes.txt")));
}

#[tokio::test]
async fn retry_without_job_timestamp_reuses_recorded_end_time() {
    // No completion timestamp on the job: the first completion stamps the
    // record, the retry must reuse that end time instead of minting a new one.
    let job = Job::new(JobId::new(1), "untimed job")
        .with_declared_input(DeclaredInput::new("http://src/file1", "file1"));

    let (service, _dispatcher) = setup_service();
    service.record_start(&job, None).await.unwrap();

    let first = service
        .record_completion(&job, &completion_listing())
        .await
        .unwrap();
    let second = service
        .record_completion(&job, &completion_listing())
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn repeated_completion_is_byte_identical() {
    let (service, dispatcher) = setup_service();
    let job = scenario_job();
    service.record_start(&job, None).await.unwrap();

    let first = service
        .record_completion(&job, &completion_listing())
        .await
        .unwrap();
    let second = service
        .record_completion(&job, &completion_listing())
        .await
        .unwrap();

    assert_eq!(first, second);
    // No duplicated generated entities on the retry path.
    let graph = parse(&second, SCENARIO_ACTIVITY);
    assert_eq!(graph.activity().generated.len(), 1);
    assert_eq!(dispatcher.submission_count(), 2);
}

#[tokio::test]
async fn reporting_outage_never_blocks_completion() {
    let dispatcher = RecordingDispatcher::failing();
    let service = ProvenanceService::new(
        sample_identity(),
        MemoryGraphStore::new(),
        dispatcher.clone(),
        Some(lineage_test_utils::TEST_REGISTRY_URI),
    )
    .unwrap();
    let job = scenario_job();

    service.record_start(&job, None).await.unwrap();
    let first = service
        .record_completion(&job, &completion_listing())
        .await
        .unwrap();
    assert_eq!(dispatcher.submission_count(), 0);
    assert_eq!(
        service.state(job.id).await.unwrap(),
        ProvenanceState::Completed
    );

    // Registry recovers; the retried completion re-finalizes identically
    // and the report finally goes out.
    dispatcher.set_failing(false);
    let second = service
        .record_completion(&job, &completion_listing())
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(dispatcher.submission_count(), 1);
}

#[tokio::test]
async fn start_is_reentrant_with_stable_uri() {
    let (service, _dispatcher) = setup_service();
    let job = scenario_job();

    let first = service.record_start(&job, None).await.unwrap();
    let second = service.record_start(&job, None).await.unwrap();

    let a = parse(&first, SCENARIO_ACTIVITY);
    let b = parse(&second, SCENARIO_ACTIVITY);
    assert_eq!(a.activity().uri(), b.activity().uri());
    assert_eq!(a.activity().used, b.activity().used);
}

#[tokio::test]
async fn transient_store_failure_is_retryable() {
    let store = FlakyGraphStore::new(MemoryGraphStore::new(), 1);
    let service =
        ProvenanceService::new(sample_identity(), store, RecordingDispatcher::new(), None)
            .unwrap();
    let job = scenario_job();

    let err = service.record_start(&job, None).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(
        service.state(job.id).await.unwrap(),
        ProvenanceState::Unstarted
    );

    // Whole-phase retry succeeds.
    service.record_start(&job, None).await.unwrap();
    assert_eq!(
        service.state(job.id).await.unwrap(),
        ProvenanceState::Started
    );
}

#[tokio::test]
async fn external_reference_joins_used_set() {
    let (service, _dispatcher) = setup_service();
    let job = scenario_job();
    let solution = uri("http://catalogue/solutions/42");

    let text = service.record_start(&job, Some(&solution)).await.unwrap();
    let graph = parse(&text, SCENARIO_ACTIVITY);
    assert_eq!(graph.activity().used.len(), 2);
    assert!(graph.activity().used.contains_uri(&solution));
}
