//! Repository layer
//!
//! Repositories are the seams between the pipeline and the worker API. Each
//! trait covers the endpoints one stage needs and is implemented for
//! [`WorkerClient`](slipway_client::WorkerClient). Unit tests substitute
//! `mockall` doubles.

mod archive;
mod jobs;
mod sources;
mod themes;

pub use archive::ArchiveRepository;
pub use jobs::JobRepository;
pub use sources::SourceRepository;
pub use themes::ThemeRepository;

#[cfg(test)]
pub use archive::MockArchiveRepository;
#[cfg(test)]
pub use jobs::MockJobRepository;
#[cfg(test)]
pub use sources::MockSourceRepository;
#[cfg(test)]
pub use themes::MockThemeRepository;
