// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers shared across crates (behind the `test-support` feature).

use crate::id::IdGen;
use crate::job::{Job, JobId, JobStatus};
use crate::resource::Resource;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use uuid::Uuid;

/// Id generator that hands out a predetermined sequence, then panics.
pub struct FixedIdGen {
    ids: Mutex<VecDeque<Uuid>>,
}

impl FixedIdGen {
    pub fn new(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self { ids: Mutex::new(ids.into_iter().collect()) }
    }
}

impl IdGen for FixedIdGen {
    #[allow(clippy::expect_used)]
    fn next_id(&self) -> Uuid {
        self.ids.lock().pop_front().expect("FixedIdGen ran out of ids")
    }
}

/// A fresh pending job with an empty payload.
pub fn pending_job() -> Job {
    job_with_status(JobStatus::Pending)
}

pub fn job_with_status(status: JobStatus) -> Job {
    Job {
        id: JobId::new(Uuid::new_v4()),
        status,
        external_id: None,
        message: None,
        payload: serde_json::Value::Null,
    }
}

/// A resource keyed by `identifier` with empty config and metadata.
pub fn resource(identifier: &str) -> Resource {
    Resource {
        identifier: identifier.to_string(),
        name: identifier.rsplit('/').next().unwrap_or(identifier).to_string(),
        kind: "test/resource".to_string(),
        version: "v1".to_string(),
        config: serde_json::Value::Null,
        metadata: BTreeMap::new(),
    }
}
