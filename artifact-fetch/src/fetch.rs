use crate::config::Config;
use crate::download::download_to;
use crate::extract::extract_zip;
use crate::github::{Artifact, GithubClient};
use crate::select::{select, Selector};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Where artifacts are listed and downloaded from.
pub trait ArtifactSource {
    fn list(&self) -> Result<Vec<Artifact>>;

    fn download(&self, artifact: &Artifact, dest: &Path) -> Result<()>;
}

impl ArtifactSource for GithubClient {
    fn list(&self) -> Result<Vec<Artifact>> {
        self.list_artifacts()
    }

    fn download(&self, artifact: &Artifact, dest: &Path) -> Result<()> {
        self.retry().run("downloading artifact", || {
            let resp = self.open_download(&artifact.archive_download_url)?;
            let len = resp.content_length();
            download_to(resp, len, dest)?;
            Ok(())
        })
    }
}

impl<S: ArtifactSource + ?Sized> ArtifactSource for &S {
    fn list(&self) -> Result<Vec<Artifact>> {
        (**self).list()
    }

    fn download(&self, artifact: &Artifact, dest: &Path) -> Result<()> {
        (**self).download(artifact, dest)
    }
}

#[derive(Debug)]
pub enum Outcome {
    Downloaded {
        artifact: Artifact,
        archive: PathBuf,
        files: Vec<PathBuf>,
    },
    NoMatch,
}

impl Outcome {
    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Downloaded { artifact, .. } => Some(artifact),
            Self::NoMatch => None,
        }
    }

    /// Process exit status. A run with nothing to fetch succeeds unless a
    /// match was required.
    pub fn exit_code(&self, require_match: bool) -> i32 {
        match self {
            Self::NoMatch if require_match => 2,
            _ => 0,
        }
    }
}

pub struct Fetcher<'a, S> {
    config: &'a Config,
    source: S,
}

impl<'a, S: ArtifactSource> Fetcher<'a, S> {
    pub fn new(config: &'a Config, source: S) -> Self {
        Self { config, source }
    }

    /// Lists, selects, downloads and extracts. Stops after the listing when
    /// nothing matches.
    pub fn run(&self, selector: &Selector) -> Result<Outcome> {
        match self.select_artifact(selector)? {
            Some(artifact) => self.fetch_artifact(artifact),
            None => Ok(Outcome::NoMatch),
        }
    }

    pub fn select_artifact(&self, selector: &Selector) -> Result<Option<Artifact>> {
        let artifacts = self.source.list()?;
        let prefix = self.config.prefix();
        let artifact = select(&artifacts, &prefix, selector).cloned();
        match &artifact {
            Some(artifact) => tracing::info!(%selector, name = %artifact.name, "selected"),
            None => {
                tracing::info!(%selector, count = artifacts.len(), "no artifact matching {}", prefix)
            }
        }
        Ok(artifact)
    }

    /// Downloads `artifact` to the archive path and extracts it.
    pub fn fetch_artifact(&self, artifact: Artifact) -> Result<Outcome> {
        let archive = self.config.archive_path();
        self.source.download(&artifact, &archive)?;
        let files = extract_zip(&archive, &self.config.lib_dir)?;
        Ok(Outcome::Downloaded {
            artifact,
            archive,
            files,
        })
    }
}
