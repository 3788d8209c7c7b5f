//! Network utilities shared by the Hugging Face and GitHub clients.
//!
//! This module provides:
//! - A rate-limit-aware HTTP client bound to one upstream service
//! - Retry logic with exponential backoff and wait hints

mod client;
mod retry;

pub use client::{HttpClient, RateLimitState};
pub use retry::{retry_async, RetryConfig, RetryDecision, RetryStats};
