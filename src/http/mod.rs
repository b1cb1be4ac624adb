//! HTTP client module
//!
//! Provides HTTP client with retry, rate limiting, and backoff strategies.
//!
//! # Features
//!
//! - **Bearer Authentication**: API key sent on every request
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Page Source**: The `PageSource` seam used by the sync engine

mod client;
mod rate_limit;
mod source;

pub use client::{HttpClient, HttpClientConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use source::{PageSource, PersonaClient};
