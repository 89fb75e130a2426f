// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_a_uuid_with_surrounding_whitespace() {
    let id: WorkspaceId = " 0191a2b3-0000-7000-8000-000000000001 ".parse().unwrap();
    assert_eq!(id.to_string(), "0191a2b3-0000-7000-8000-000000000001");
}

#[test]
fn rejects_non_uuid_input() {
    let err = "not-a-uuid".parse::<WorkspaceId>().unwrap_err();
    assert!(err.to_string().contains("not-a-uuid"));
}

#[test]
fn serializes_as_the_bare_uuid_string() {
    let id: WorkspaceId = "0191a2b3-0000-7000-8000-000000000001".parse().unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"0191a2b3-0000-7000-8000-000000000001\"");
}
