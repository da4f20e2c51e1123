/// Supplies the lines printed for the version flag.
pub trait VersionProvider {
    fn versions(&self) -> Vec<String>;
}

/// The crate version, with git details for non-release builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildVersionProvider;

impl VersionProvider for BuildVersionProvider {
    fn versions(&self) -> Vec<String> {
        const VERSION: &str = env!("CARGO_PKG_VERSION");
        const GIT_HASH: &str = env!("GIT_HASH");
        const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
        const IS_RELEASE: &str = env!("IS_RELEASE");

        let mut lines = vec![format!("{} v{}", env!("CARGO_PKG_NAME"), VERSION)];
        if IS_RELEASE != "true" && !GIT_HASH.is_empty() {
            lines.push(format!("dev: {} {}", GIT_HASH, GIT_COMMIT_DATE));
        }
        lines
    }
}

/// Fixed version lines supplied by the host.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StaticVersions(pub Vec<String>);

impl StaticVersions {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(lines.into_iter().map(Into::into).collect())
    }
}

impl VersionProvider for StaticVersions {
    fn versions(&self) -> Vec<String> {
        self.0.clone()
    }
}
