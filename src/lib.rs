//! multitool: a caching HTTP gateway in front of the Gemini text-generation API.
//!
//! A request names a [`Task`] and carries raw input. The gateway fingerprints
//! `(task, input)`, answers from the responses log when an earlier record
//! matches, and otherwise templates a prompt, calls the generation service and
//! appends the query and response to flat JSON logs. Failures go to an errors
//! log.
//!
//! ```rust,no_run
//! # async fn run() -> multitool::Result<()> {
//! use multitool::{Config, Gateway, MultitoolRequest, Task};
//!
//! let config = Config::load(None)?;
//! let api_key = multitool::config::api_key()?;
//! let gateway = Gateway::from_config(&config, &api_key).await?;
//! let outcome = gateway
//!     .handle(&MultitoolRequest::new(Task::ToneDetector, "I'm absolutely devastated."))
//!     .await;
//! println!("{:?}", outcome.response());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logs;
pub mod media;
pub mod providers;
pub mod task;

pub use config::Config;
pub use error::{MultitoolError, Result};
pub use gateway::{Failure, FailureKind, Gateway, MultitoolRequest, Outcome};
pub use task::Task;
