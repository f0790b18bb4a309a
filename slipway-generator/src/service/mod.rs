//! Service layer
//!
//! One service per pipeline stage. Services hold the stage logic and reach the
//! worker only through repository traits.

pub mod fetcher;
pub mod materializer;
pub mod poller;
pub mod themes;
pub mod upload;

pub use fetcher::{FetchedFile, GithubFetcher, RepositoryRef, SourceFetcher};
pub use materializer::{ArchiveResult, ResultMaterializer};
pub use poller::JobPoller;
pub use themes::ThemeResolver;
pub use upload::SourceUploader;
