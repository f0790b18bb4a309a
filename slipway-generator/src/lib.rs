//! Slipway Generator
//!
//! Turns a repository of presentation sources into a rendered presentation by
//! driving a remote generation worker:
//!
//! health check -> fetch -> upload -> resolve themes -> submit and wait -> materialize
//!
//! ```no_run
//! use slipway_generator::{Generator, GeneratorConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), slipway_generator::GenerateError> {
//! let config = GeneratorConfig::new("https://github.com/acme/deck", "http://localhost:8081");
//! let result = Generator::new(config)?.generate(&CancellationToken::new()).await?;
//! println!("entry point: {:?}", result.archive.entry_point);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod repository;
pub mod service;

pub use config::{GeneratorConfig, UploadMode, WaitSpec};
pub use error::{ConfigError, FetchError, GenerateError, MaterializeError, WaitError};
pub use pipeline::{GenerationResult, Generator, Stages};
pub use service::{ArchiveResult, FetchedFile, JobPoller, RepositoryRef};
