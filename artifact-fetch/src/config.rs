use crate::retry::RetryPolicy;
use crate::select::Selector;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PROJECT: &str = "Altseed2";
pub const DEFAULT_API_URL: &str =
    "https://api.github.com/repos/altseed/Altseed2-csharp/actions/artifacts";
pub const TOKEN_VAR: &str = "GITHUB_ACCESS_TOKEN";
pub const PER_PAGE: u32 = 1000;

#[derive(Clone, Debug, Parser)]
pub struct FetchArgs {
    /// Build identifier to fetch, usually a commit hash. Fetches the latest
    /// artifact when omitted.
    #[clap(value_name = "VERSION")]
    pub build: Option<String>,
    /// Base directory containing `.env` and `lib/`.
    #[clap(long, default_value = ".")]
    pub root: PathBuf,
    /// Path of the `.env` file holding the access token [default: <root>/.env]
    #[clap(long)]
    pub env_file: Option<PathBuf>,
    /// Directory the artifact is extracted into [default: <root>/lib]
    #[clap(long)]
    pub lib_dir: Option<PathBuf>,
    /// Artifact name prefix, without the trailing dash.
    #[clap(long, default_value = DEFAULT_PROJECT)]
    pub project: String,
    /// Artifact listing endpoint.
    #[clap(long, env = "ARTIFACT_FETCH_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    /// Only accept an artifact named exactly `<project>-<version>`.
    #[clap(long, requires = "build")]
    pub exact: bool,
    /// Request timeout in seconds. Requests never time out by default.
    #[clap(long)]
    pub timeout: Option<u64>,
    /// Number of retries on connection errors, timeouts and 5xx responses.
    #[clap(long, default_value_t = 0)]
    pub retries: u32,
    /// Exit with status 2 when no artifact matches.
    #[clap(long)]
    pub require_match: bool,
}

impl FetchArgs {
    pub fn selector(&self) -> Selector {
        Selector::new(self.build.clone(), self.exact)
    }

    pub fn env_file(&self) -> PathBuf {
        self.env_file
            .clone()
            .unwrap_or_else(|| self.root.join(".env"))
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.lib_dir.clone().unwrap_or_else(|| self.root.join("lib"))
    }
}

/// Access token sent with the artifact download.
#[derive(Clone, Eq, PartialEq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Reads the token from the process environment, falling back to the
    /// `.env` file. The environment is not modified.
    pub fn load(env_file: &Path) -> Result<Self> {
        match std::env::var(TOKEN_VAR) {
            Ok(token) if !token.is_empty() => {
                tracing::debug!("using {} from the environment", TOKEN_VAR);
                Ok(Self(token))
            }
            _ => Self::from_env_file(env_file),
        }
    }

    pub fn from_env_file(path: &Path) -> Result<Self> {
        let entries = dotenvy::from_path_iter(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        for entry in entries {
            let (key, value) =
                entry.with_context(|| format!("failed to parse {}", path.display()))?;
            if key == TOKEN_VAR {
                anyhow::ensure!(!value.is_empty(), "{} is empty in {}", TOKEN_VAR, path.display());
                return Ok(Self(value));
            }
        }
        anyhow::bail!("{} is not set in {}", TOKEN_VAR, path.display());
    }

    pub fn header_value(&self) -> String {
        format!("token {}", self.0)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub project: String,
    pub api_url: String,
    pub per_page: u32,
    pub lib_dir: PathBuf,
    pub credential: Credential,
    pub timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

impl Config {
    pub fn new(lib_dir: PathBuf, credential: Credential) -> Self {
        Self {
            project: DEFAULT_PROJECT.into(),
            api_url: DEFAULT_API_URL.into(),
            per_page: PER_PAGE,
            lib_dir,
            credential,
            timeout: None,
            retry: RetryPolicy::none(),
        }
    }

    pub fn from_args(args: &FetchArgs) -> Result<Self> {
        let credential = Credential::load(&args.env_file())?;
        Ok(Self::from_args_with_credential(args, credential))
    }

    pub fn from_args_with_credential(args: &FetchArgs, credential: Credential) -> Self {
        Self {
            project: args.project.clone(),
            api_url: args.api_url.clone(),
            timeout: args.timeout.map(Duration::from_secs),
            retry: RetryPolicy::new(args.retries),
            ..Self::new(args.lib_dir(), credential)
        }
    }

    /// Name prefix shared by every artifact of the project.
    pub fn prefix(&self) -> String {
        format!("{}-", self.project)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.lib_dir
            .join(format!("{}.zip", self.project.to_lowercase()))
    }
}
