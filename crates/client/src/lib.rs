// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Typed REST client for the control plane.
//!
//! The job and resource surfaces are traits so the loops stay generic and
//! testable; [`ControlPlaneClient`] is the production implementation.

mod api;
mod error;
mod http;
mod retry;

pub use api::{JobApi, ResourceApi};
pub use error::ApiError;
pub use reqwest::StatusCode;
pub use http::{ControlPlaneClient, ControlPlaneConfig};
pub use retry::with_retries;
