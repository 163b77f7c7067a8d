//! Fetches build artifacts from the GitHub Actions API and unpacks them into
//! a local library directory.
//!
//! The pipeline is strictly linear: list the artifacts of a repository, pick
//! one by name, download its zip archive and extract it.
//!
//! ```no_run
//! use artifact_fetch::{Config, Credential, Fetcher, GithubClient, Outcome, Selector};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let credential = Credential::load(Path::new(".env"))?;
//! let config = Config::new("lib".into(), credential);
//! let client = GithubClient::new(&config)?;
//! if let Outcome::Downloaded { files, .. } = Fetcher::new(&config, client).run(&Selector::Latest)? {
//!     println!("{} files", files.len());
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod download;
mod extract;
mod fetch;
mod github;
mod retry;
mod select;

pub use crate::config::{
    Config, Credential, FetchArgs, DEFAULT_API_URL, DEFAULT_PROJECT, PER_PAGE, TOKEN_VAR,
};
pub use crate::download::{copy_chunked, download_to, CHUNK_SIZE};
pub use crate::extract::extract_zip;
pub use crate::fetch::{ArtifactSource, Fetcher, Outcome};
pub use crate::github::{Artifact, ArtifactList, GithubClient};
pub use crate::retry::{is_transient, RetryPolicy};
pub use crate::select::{select, Selector};
