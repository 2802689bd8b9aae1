use crate::error::{LoadError, Result};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::memo::Memo;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use stixview_graph::Bundle;

pub const GITHUB_API: &str = "https://api.github.com";

/// Where a bundle comes from; also the memoization key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BundleSource {
    Url(String),
    Gist { id: String, file: Option<String> },
}

impl BundleSource {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    pub fn gist(id: impl Into<String>, file: Option<String>) -> Self {
        Self::Gist {
            id: id.into(),
            file,
        }
    }
}

impl fmt::Display for BundleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Gist { id, file: Some(file) } => write!(f, "gist {id} ({file})"),
            Self::Gist { id, file: None } => write!(f, "gist {id}"),
        }
    }
}

/// A parsed bundle and the URL it can be downloaded from
#[derive(Debug, Clone)]
pub struct LoadedBundle {
    pub bundle: Arc<Bundle>,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct GistResponse {
    #[serde(default)]
    files: BTreeMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    content: Option<String>,
    raw_url: Option<String>,
    #[serde(default)]
    truncated: bool,
}

/// Loads bundles by URL or gist id.
///
/// Every source is fetched at most once per loader: concurrent requests for
/// the same source share one fetch and results are kept for the loader's
/// lifetime.
pub struct BundleLoader {
    fetcher: Arc<dyn Fetcher>,
    gist_api: String,
    cache: Memo<BundleSource, Result<LoadedBundle>>,
}

impl BundleLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            gist_api: GITHUB_API.to_string(),
            cache: Memo::new(),
        }
    }

    /// Loader over HTTP with the given request timeout
    pub fn http(timeout: Duration) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpFetcher::new(timeout)?)))
    }

    /// Point gist lookups at another API root
    pub fn with_gist_api(mut self, base: impl Into<String>) -> Self {
        self.gist_api = base.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn load(&self, source: &BundleSource) -> Result<LoadedBundle> {
        self.cache
            .get_or_init(source, || self.fetch(source))
            .await
    }

    pub async fn load_url(&self, url: &str) -> Result<LoadedBundle> {
        self.load(&BundleSource::url(url)).await
    }

    pub async fn load_gist(&self, id: &str, file: Option<&str>) -> Result<LoadedBundle> {
        self.load(&BundleSource::gist(id, file.map(str::to_string)))
            .await
    }

    /// Number of sources requested so far
    pub fn cached_sources(&self) -> usize {
        self.cache.len()
    }

    async fn fetch(&self, source: &BundleSource) -> Result<LoadedBundle> {
        log::info!("Loading bundle from {source}");
        let loaded = match source {
            BundleSource::Url(url) => self.fetch_url(url).await,
            BundleSource::Gist { id, file } => self.fetch_gist(id, file.as_deref()).await,
        };
        if let Err(err) = &loaded {
            log::debug!("Loading {source} failed: {err}");
        }
        loaded
    }

    async fn fetch_url(&self, url: &str) -> Result<LoadedBundle> {
        let text = self.fetcher.get_text(url).await?;
        let bundle = Bundle::from_json_str(&text).map_err(|err| LoadError::from_graph(url, err))?;
        Ok(LoadedBundle {
            bundle: Arc::new(bundle),
            url: url.to_string(),
        })
    }

    async fn fetch_gist(&self, id: &str, file: Option<&str>) -> Result<LoadedBundle> {
        let api_url = format!("{}/gists/{id}", self.gist_api);
        let text = self.fetcher.get_text(&api_url).await?;
        let gist: GistResponse =
            serde_json::from_str(&text).map_err(|err| LoadError::parse(&api_url, err))?;

        let (name, details) = match file {
            Some(name) => gist
                .files
                .get_key_value(name)
                .ok_or_else(|| LoadError::GistFileMissing {
                    gist: id.to_string(),
                    file: name.to_string(),
                })?,
            None => gist.files.iter().next().ok_or_else(|| LoadError::GistEmpty {
                gist: id.to_string(),
            })?,
        };

        // the API inlines at most ~1MB of each file
        let content = match (&details.content, &details.raw_url) {
            (Some(content), _) if !details.truncated => content.clone(),
            (_, Some(raw_url)) => self.fetcher.get_text(raw_url).await?,
            (Some(content), None) => content.clone(),
            (None, None) => {
                return Err(LoadError::Bundle {
                    source_name: format!("gist {id}/{name}"),
                    message: "file has neither content nor raw_url".to_string(),
                })
            }
        };

        let source_name = format!("gist {id}/{name}");
        let bundle =
            Bundle::from_json_str(&content).map_err(|err| LoadError::from_graph(&source_name, err))?;
        Ok(LoadedBundle {
            bundle: Arc::new(bundle),
            url: details.raw_url.clone().unwrap_or(api_url),
        })
    }
}
