// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation seams.

use uuid::Uuid;

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    if s.len() <= n {
        s
    } else {
        &s[..n]
    }
}

/// Mint an opaque correlation id for a request envelope.
///
/// 21 URL-safe characters; unique for the lifetime of a correlator.
pub fn request_id() -> String {
    nanoid::nanoid!(21)
}

/// Source of fresh job ids. Seam so tests control id assignment.
pub trait IdGen: Send + Sync {
    fn next_id(&self) -> Uuid;
}

/// Production id generator backed by random v4 UUIDs.
#[derive(Clone, Copy, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
