//! Oxbow Operation Tracking
//!
//! Control-flow layer over `oxbow-api`: mutating control-plane calls
//! return batches of asynchronous [`oxbow_api::Operation`]s, and this
//! crate provides the two primitives every resource workflow needs:
//!
//! - [`wait_unfinished`] blocks until a batch of operations reaches a
//!   terminal status, polling each one concurrently.
//! - [`RetryPolicy::run`] re-invokes an idempotent action on a fixed
//!   schedule while it fails transiently (rate limit, overload, lock).
//!
//! The two compose: the retried action typically performs a mutating
//! call and then waits on the operations it spawned, so a transient
//! failure anywhere in the sequence replays the whole sequence.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use oxbow_api::models::CreateBranchRequest;
//! use oxbow_api::{Api, ApiConfig};
//! use oxbow_ops::{RetryPolicy, WaitConfig, wait_unfinished};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(Api::new(ApiConfig::from_env()?));
//! let retry = RetryPolicy::new(Duration::from_secs(5), 10);
//! let wait = WaitConfig::default();
//!
//! retry
//!     .run("create branch", || {
//!         let api = api.clone();
//!         let wait = wait.clone();
//!         async move {
//!             let (_branch, operations) = api
//!                 .create_branch("damp-sea-42", &CreateBranchRequest::default())
//!                 .await?;
//!             wait_unfinished(api, operations, &wait).await
//!         }
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod retry;
pub mod wait;

// Re-exports
pub use error::{OpsError, Result};
pub use retry::{RetryPolicy, is_retryable};
pub use wait::{WaitConfig, wait_unfinished};
