// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{FakeJobApi, FakeRunner};
use wharf_core::test_support::{job_with_status, pending_job};

fn agent(api: Arc<FakeJobApi>, runner: Arc<FakeRunner>) -> JobAgent<FakeJobApi, FakeRunner> {
    let mut config = JobAgentConfig::new("edge-1");
    config.fan_out = 2;
    config.call_timeout = Duration::from_millis(200);
    JobAgent::new(api, runner, config)
}

#[tokio::test]
async fn claim_and_start_with_a_failing_runner_isolates_the_failure() {
    let api = Arc::new(FakeJobApi::new());
    let runner = Arc::new(FakeRunner::new());
    let (j1, j2, j3) = (pending_job(), pending_job(), pending_job());
    runner.stub_start(j1.id, Ok(Some("run-1".to_string())));
    runner.stub_start(j2.id, Err("boom".to_string()));
    runner.stub_start(j3.id, Ok(None));
    for job in [&j1, &j2, &j3] {
        api.push_queued(job.clone());
    }

    agent(api.clone(), runner.clone()).run_cycle(&CancellationToken::new()).await;

    // Every claimed job produced exactly one start invocation.
    assert_eq!(runner.started().len(), 3);

    let j1_updates = api.updates_for(j1.id);
    assert_eq!(j1_updates, vec![JobUpdate::external_id("run-1")]);

    let j2_updates = api.updates_for(j2.id);
    assert_eq!(
        j2_updates,
        vec![JobUpdate::status(JobStatus::InProgress).with_message("failed to start: boom")]
    );

    // No external id returned, nothing to report.
    assert!(api.updates_for(j3.id).is_empty());
}

#[tokio::test]
async fn poll_and_report_sends_one_update_per_running_job() {
    let api = Arc::new(FakeJobApi::new());
    let runner = Arc::new(FakeRunner::new());
    let (j1, j2) =
        (job_with_status(JobStatus::InProgress), job_with_status(JobStatus::InProgress));
    runner.stub_status(j1.id, JobStatus::Successful, None);
    runner.stub_status(j2.id, JobStatus::InProgress, Some("waiting for log drain".to_string()));
    api.push_running(j1.clone());
    api.push_running(j2.clone());

    agent(api.clone(), runner.clone()).run_cycle(&CancellationToken::new()).await;

    assert_eq!(api.updates_for(j1.id), vec![JobUpdate::status(JobStatus::Successful)]);
    assert_eq!(
        api.updates_for(j2.id),
        vec![JobUpdate::status(JobStatus::InProgress).with_message("waiting for log drain")]
    );
}

#[tokio::test]
async fn an_empty_claim_is_a_noop() {
    let api = Arc::new(FakeJobApi::new());
    let runner = Arc::new(FakeRunner::new());

    agent(api.clone(), runner.clone()).run_cycle(&CancellationToken::new()).await;

    assert!(runner.started().is_empty());
    assert!(runner.polled().is_empty());
    assert!(api.updates().is_empty());
}

#[tokio::test]
async fn terminal_jobs_in_the_running_list_are_not_polled() {
    let api = Arc::new(FakeJobApi::new());
    let runner = Arc::new(FakeRunner::new());
    api.push_running(job_with_status(JobStatus::Successful));

    agent(api.clone(), runner.clone()).run_cycle(&CancellationToken::new()).await;

    assert!(runner.polled().is_empty());
    assert!(api.updates().is_empty());
}

#[tokio::test]
async fn start_invocations_match_the_claimed_set_under_fan_out() {
    let api = Arc::new(FakeJobApi::new());
    let runner = Arc::new(FakeRunner::new());
    let jobs: Vec<_> = (0..5).map(|_| pending_job()).collect();
    for job in &jobs {
        api.push_queued(job.clone());
    }

    agent(api.clone(), runner.clone()).run_cycle(&CancellationToken::new()).await;

    let mut started = runner.started();
    started.sort_by_key(|id| id.to_string());
    let mut expected: Vec<_> = jobs.iter().map(|j| j.id).collect();
    expected.sort_by_key(|id| id.to_string());
    assert_eq!(started, expected);
}

#[tokio::test]
async fn claim_failure_does_not_stop_the_poll_phase() {
    let api = Arc::new(FakeJobApi::new());
    let runner = Arc::new(FakeRunner::new());
    api.fail_claims();
    let running = job_with_status(JobStatus::InProgress);
    runner.stub_status(running.id, JobStatus::Successful, None);
    api.push_running(running.clone());

    agent(api.clone(), runner.clone()).run_cycle(&CancellationToken::new()).await;

    assert_eq!(api.updates_for(running.id), vec![JobUpdate::status(JobStatus::Successful)]);
}

#[tokio::test(start_paused = true)]
async fn a_start_deadline_expiry_is_reported_as_still_in_progress() {
    let api = Arc::new(FakeJobApi::new());
    let runner = Arc::new(FakeRunner::new());
    runner.delay_starts(Duration::from_secs(600));
    let job = pending_job();
    api.push_queued(job.clone());

    agent(api.clone(), runner.clone()).run_cycle(&CancellationToken::new()).await;

    let updates = api.updates_for(job.id);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].status, Some(JobStatus::InProgress));
    let message = updates[0].message.clone().unwrap();
    assert!(message.starts_with("failed to start: timed out"), "message: {message}");
}

#[tokio::test]
async fn a_status_poll_failure_reports_a_message_without_claiming_a_phase() {
    let api = Arc::new(FakeJobApi::new());
    let runner = Arc::new(FakeRunner::new());
    let job = job_with_status(JobStatus::InProgress);
    api.push_running(job.clone());
    // No status stub, but override the default by making status fail.
    runner.fail_status(job.id, "permission denied");

    agent(api.clone(), runner.clone()).run_cycle(&CancellationToken::new()).await;

    let updates = api.updates_for(job.id);
    assert_eq!(updates.len(), 1);
    assert!(updates[0].status.is_none());
    assert_eq!(updates[0].message.as_deref(), Some("failed to poll status: permission denied"));
}
