//! Job agent loop specs
//!
//! Claim-and-start with a failing runner, poll-and-report, and the
//! terminal-status-stops-polling contract across cycles.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wharf_agent::test_support::{FakeJobApi, FakeRunner};
use wharf_agent::{JobAgent, JobAgentConfig};
use wharf_core::test_support::{job_with_status, pending_job};
use wharf_core::{JobStatus, JobUpdate};

fn agent(api: Arc<FakeJobApi>, runner: Arc<FakeRunner>) -> JobAgent<FakeJobApi, FakeRunner> {
    JobAgent::new(api, runner, JobAgentConfig::new("edge-1"))
}

#[tokio::test]
async fn one_cycle_starts_claims_and_reports_running_statuses() {
    let api = Arc::new(FakeJobApi::new());
    let runner = Arc::new(FakeRunner::new());

    // Three queued jobs; the middle one fails to start.
    let (q1, q2, q3) = (pending_job(), pending_job(), pending_job());
    runner.stub_start(q1.id, Ok(Some("run-1".to_string())));
    runner.stub_start(q2.id, Err("boom".to_string()));
    runner.stub_start(q3.id, Ok(Some("run-3".to_string())));
    for job in [&q1, &q2, &q3] {
        api.push_queued(job.clone());
    }

    // Two running jobs in different phases.
    let (r1, r2) =
        (job_with_status(JobStatus::InProgress), job_with_status(JobStatus::InProgress));
    runner.stub_status(r1.id, JobStatus::Successful, None);
    runner.stub_status(r2.id, JobStatus::InProgress, Some("waiting for log drain".to_string()));
    api.push_running(r1.clone());
    api.push_running(r2.clone());

    agent(api.clone(), runner.clone()).run_cycle(&CancellationToken::new()).await;

    assert_eq!(runner.started().len(), 3);
    assert_eq!(api.updates_for(q1.id), vec![JobUpdate::external_id("run-1")]);
    assert_eq!(
        api.updates_for(q2.id),
        vec![JobUpdate::status(JobStatus::InProgress).with_message("failed to start: boom")]
    );
    assert_eq!(api.updates_for(q3.id), vec![JobUpdate::external_id("run-3")]);
    assert_eq!(api.updates_for(r1.id), vec![JobUpdate::status(JobStatus::Successful)]);
    assert_eq!(
        api.updates_for(r2.id),
        vec![JobUpdate::status(JobStatus::InProgress).with_message("waiting for log drain")]
    );
}

#[tokio::test]
async fn a_terminal_report_ends_polling_in_later_cycles() {
    let api = Arc::new(FakeJobApi::new());
    let runner = Arc::new(FakeRunner::new());
    let job = job_with_status(JobStatus::InProgress);
    runner.stub_status(job.id, JobStatus::Successful, None);
    api.push_running(job.clone());

    let agent = agent(api.clone(), runner.clone());
    let token = CancellationToken::new();

    // Cycle N reports the terminal status.
    agent.run_cycle(&token).await;
    assert_eq!(api.updates_for(job.id), vec![JobUpdate::status(JobStatus::Successful)]);

    // The control plane drops the job from the running list; cycle N+1
    // issues no further status calls for it.
    api.set_running(Vec::new());
    agent.run_cycle(&token).await;
    assert_eq!(runner.polled().len(), 1);
    assert_eq!(api.updates_for(job.id).len(), 1);
}

#[tokio::test]
async fn reclaiming_the_same_terminal_update_is_accepted() {
    let api = Arc::new(FakeJobApi::new());
    let runner = Arc::new(FakeRunner::new());
    let job = job_with_status(JobStatus::InProgress);
    runner.stub_status(job.id, JobStatus::Successful, None);
    api.push_running(job.clone());

    let agent = agent(api.clone(), runner.clone());
    let token = CancellationToken::new();
    agent.run_cycle(&token).await;
    // The server kept the job listed (e.g. a slow materializer); the
    // repeated terminal update must go through without error.
    agent.run_cycle(&token).await;

    assert_eq!(
        api.updates_for(job.id),
        vec![
            JobUpdate::status(JobStatus::Successful),
            JobUpdate::status(JobStatus::Successful),
        ]
    );
}
