use anyhow::{Context, Result, bail};
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::path::PathBuf;

use crate::{
    http::HttpClient,
    lock::{LockGroupPattern, builtin_lock_groups, load_lock_groups},
    package::parse_package_list,
    resolver::{MavenResolver, Repository, default_repositories},
    runtime::Runtime,
};

/// Environment variable holding a bearer token for private repositories.
pub const REPO_TOKEN_VAR: &str = "AARSYNC_REPO_TOKEN";

/// Options for one sync run, as collected by the CLI.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Semicolon-delimited package specifiers
    pub packages: String,
    pub dest: PathBuf,
    /// Repository URLs or directories; empty means the defaults
    pub repositories: Vec<String>,
    pub staging_dir: Option<PathBuf>,
    /// JSON file with additional lock groups
    pub lock_groups: Option<PathBuf>,
}

pub struct Config<R: Runtime> {
    pub resolver: MavenResolver<R>,
    pub lock_groups: Vec<LockGroupPattern>,
    pub packages: Vec<String>,
    pub dest: PathBuf,
}

impl<R: Runtime> Config<R> {
    pub fn new(runtime: R, options: SyncOptions) -> Result<Self> {
        let packages = parse_package_list(&options.packages);
        if packages.is_empty() {
            bail!("No packages to resolve. Pass --packages or set AARSYNC_PACKAGES.");
        }

        let mut lock_groups = builtin_lock_groups()?;
        if let Some(path) = &options.lock_groups {
            lock_groups.extend(load_lock_groups(&runtime, path)?);
        }

        let repositories = if options.repositories.is_empty() {
            default_repositories()
        } else {
            options
                .repositories
                .iter()
                .map(|r| r.parse::<Repository>())
                .collect::<Result<Vec<_>>>()?
        };

        let staging_dir = match options.staging_dir {
            Some(dir) => dir,
            None => default_staging_dir(&runtime),
        };
        debug!("Staging downloads in {:?}", staging_dir);

        let mut headers = HeaderMap::new();
        if let Ok(token) = runtime.env_var(REPO_TOKEN_VAR) {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .with_context(|| format!("{} is not a valid header value", REPO_TOKEN_VAR))?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using {} for repository authentication", REPO_TOKEN_VAR);
        }

        let client = Client::builder()
            .user_agent("aarsync-cli")
            .default_headers(headers)
            .build()?;

        let resolver = MavenResolver::new(
            runtime,
            HttpClient::new(client),
            repositories,
            staging_dir,
        );

        Ok(Self {
            resolver,
            lock_groups,
            packages,
            dest: options.dest,
        })
    }
}

/// `<cache dir>/aarsync/staging`, or a temp directory when there is no cache dir.
pub fn default_staging_dir<R: Runtime>(runtime: &R) -> PathBuf {
    match runtime.cache_dir() {
        Some(cache) => cache.join("aarsync").join("staging"),
        None => runtime.temp_dir().join("aarsync-staging"),
    }
}
