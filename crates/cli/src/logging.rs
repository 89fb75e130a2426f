// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured log setup for the CLI process.

use tracing_subscriber::EnvFilter;

/// Initialize the subscriber. Filter comes from `WHARF_LOG` (default
/// `info`), e.g. `WHARF_LOG=wharf_agent=debug,info`.
pub fn init() {
    let filter = EnvFilter::try_from_env("WHARF_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
