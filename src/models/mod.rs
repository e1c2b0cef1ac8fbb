// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod aggregate;
pub mod token;

pub use activity::{ActivityRecord, DateWindow, SummaryActivityV3};
pub use aggregate::ActivityAggregate;
pub use token::OAuthToken;
