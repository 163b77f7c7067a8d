use crate::github::Artifact;

/// Which artifact of the listing to fetch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Selector {
    /// First artifact whose name contains the project prefix.
    Latest,
    /// Artifact named `<prefix><version>`, or `Latest` if there is none.
    Version(String),
    /// Artifact named `<prefix><version>`, nothing otherwise.
    ExactOnly(String),
}

impl Selector {
    pub fn new(version: Option<String>, exact: bool) -> Self {
        match version {
            Some(version) if exact => Self::ExactOnly(version),
            Some(version) => Self::Version(version),
            None => Self::Latest,
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Latest => None,
            Self::Version(version) | Self::ExactOnly(version) => Some(version),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Version(version) => write!(f, "{} (or latest)", version),
            Self::ExactOnly(version) => write!(f, "{}", version),
        }
    }
}

/// Picks an artifact, scanning `artifacts` in listing order.
pub fn select<'a>(artifacts: &'a [Artifact], prefix: &str, selector: &Selector) -> Option<&'a Artifact> {
    match selector {
        Selector::Latest => latest(artifacts, prefix),
        Selector::Version(version) => {
            exact(artifacts, prefix, version).or_else(|| {
                let fallback = latest(artifacts, prefix);
                if let Some(artifact) = fallback {
                    tracing::warn!(
                        "no artifact named {}{}, falling back to {}",
                        prefix,
                        version,
                        artifact.name
                    );
                }
                fallback
            })
        }
        Selector::ExactOnly(version) => exact(artifacts, prefix, version),
    }
}

fn exact<'a>(artifacts: &'a [Artifact], prefix: &str, version: &str) -> Option<&'a Artifact> {
    let name = format!("{}{}", prefix, version);
    artifacts.iter().find(|artifact| artifact.name == name)
}

fn latest<'a>(artifacts: &'a [Artifact], prefix: &str) -> Option<&'a Artifact> {
    artifacts.iter().find(|artifact| artifact.name.contains(prefix))
}
