//! Inventory fan-out specs
//!
//! Two regions with one failing, rule declaration ordering, and
//! idempotent re-upserts.

use std::sync::Arc;
use wharf_core::test_support::resource;
use wharf_core::{DependencyType, RelationshipRule, WorkspaceId};
use wharf_sync::test_support::{FakeResourceApi, FakeSource, ResourceCall};
use wharf_sync::{sync_once, SyncOptions, SyncReport};

fn workspace() -> WorkspaceId {
    "0191a2b3-0000-7000-8000-000000000001".parse().unwrap()
}

fn rule() -> RelationshipRule {
    RelationshipRule {
        reference: "vm-to-network".to_string(),
        name: "vm associated with network".to_string(),
        dependency_type: DependencyType::AssociatedWith,
        source_kind: "cloud/vm".to_string(),
        source_version: "v1".to_string(),
        target_kind: "cloud/network".to_string(),
        target_version: "v1".to_string(),
        metadata_keys: vec!["network/id".to_string()],
    }
}

#[tokio::test]
async fn a_failing_region_does_not_block_the_others() {
    let api = Arc::new(FakeResourceApi::new());
    let source = FakeSource::new("cloud", &["eu-west-1", "us-east-1"]).with_rules(vec![rule()]);
    source.stub_shard(
        "eu-west-1",
        Ok((1..=5).map(|n| resource(&format!("cloud://eu-west-1/vm/{n}"))).collect()),
    );
    source.stub_shard("us-east-1", Err("permission denied at pagination".to_string()));

    let report = sync_once(api.clone(), &source, &SyncOptions::new(workspace())).await.unwrap();

    assert_eq!(report, SyncReport { shards_ok: 1, shards_failed: 1, upserted: 5 });

    // The provider is ensured exactly once, rules precede the upsert, and
    // the batch is exactly the successful region's resources.
    let calls = api.calls();
    assert!(matches!(calls[0], ResourceCall::EnsureProvider { .. }));
    assert!(matches!(calls[1], ResourceCall::DeclareRules { count: 1, .. }));
    match &calls[2] {
        ResourceCall::Upsert { identifiers, .. } => {
            let mut sorted = identifiers.clone();
            sorted.sort();
            let expected: Vec<String> =
                (1..=5).map(|n| format!("cloud://eu-west-1/vm/{n}")).collect();
            assert_eq!(sorted, expected);
        }
        other => panic!("expected an upsert, saw {other:?}"),
    }
    assert_eq!(calls.len(), 3);
}

#[tokio::test]
async fn repeated_cycles_publish_the_same_snapshot_without_drift() {
    let api = Arc::new(FakeResourceApi::new());
    let source = FakeSource::new("cloud", &["eu-west-1"]);
    source.stub_shard("eu-west-1", Ok(vec![resource("cloud://eu-west-1/vm/1")]));
    let opts = SyncOptions::new(workspace());

    let first = sync_once(api.clone(), &source, &opts).await.unwrap();
    let second = sync_once(api.clone(), &source, &opts).await.unwrap();

    assert_eq!(first, second);
    let upserts: Vec<_> = api
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            ResourceCall::Upsert { identifiers, .. } => Some(identifiers),
            _ => None,
        })
        .collect();
    assert_eq!(upserts.len(), 2);
    assert_eq!(upserts[0], upserts[1]);
}
