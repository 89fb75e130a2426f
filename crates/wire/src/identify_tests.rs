// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use wharf_core::WorkspaceId;

#[test]
fn identify_payload_uses_camel_case_wire_names() {
    let workspace: WorkspaceId = "0191a2b3-0000-7000-8000-000000000001".parse().unwrap();
    let mut identity = AgentIdentity::new("edge-1", workspace);
    identity.associated_resources.push("k8s://prod/cluster".to_string());
    identity.metadata.insert("region".to_string(), "eu-west-1".to_string());

    let json = serde_json::to_value(IdentifyPayload::from(&identity)).unwrap();
    assert_eq!(json["name"], "edge-1");
    assert_eq!(json["associatedResources"][0], "k8s://prod/cluster");
    assert_eq!(json["metadata"]["region"], "eu-west-1");
}

#[test]
fn identify_payload_tolerates_missing_collections() {
    let payload: IdentifyPayload =
        serde_json::from_value(serde_json::json!({ "name": "edge-1" })).unwrap();
    assert!(payload.metadata.is_empty());
    assert!(payload.associated_resources.is_empty());
}
