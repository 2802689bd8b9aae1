use anyhow::{Context as AnyhowContext, Result};
use clap::Args;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stixview_graph::Bundle;
use stixview_loader::{ingest_bytes, ingest_files, BundleLoader, BundleSource, GITHUB_API};

/// Where to read the bundle from (stdin when nothing is given)
#[derive(Args, Debug)]
pub(crate) struct SourceArgs {
    /// Bundle file; when several are given only the first is loaded
    #[arg(long = "file", value_name = "PATH", num_args = 1.., conflicts_with_all = ["url", "gist"])]
    files: Vec<PathBuf>,

    /// Fetch the bundle from a URL
    #[arg(long, conflicts_with = "gist")]
    url: Option<String>,

    /// Fetch the bundle from a GitHub gist
    #[arg(long, value_name = "ID")]
    gist: Option<String>,

    /// File inside the gist (default: first file)
    #[arg(long, value_name = "NAME", requires = "gist")]
    gist_file: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Gist API root
    #[arg(long, hide = true, default_value = GITHUB_API)]
    gist_api: String,
}

impl SourceArgs {
    pub(crate) async fn load(&self) -> Result<Arc<Bundle>> {
        if !self.files.is_empty() {
            let bundle = ingest_files(&self.files)
                .await
                .context("Failed to load bundle file")?;
            return Ok(Arc::new(bundle));
        }

        if let Some(source) = self.remote() {
            let loader = BundleLoader::http(Duration::from_secs(self.timeout_secs))
                .context("Failed to create HTTP client")?
                .with_gist_api(self.gist_api.as_str());
            let loaded = loader
                .load(&source)
                .await
                .with_context(|| format!("Failed to fetch bundle from {source}"))?;
            log::debug!("Bundle downloadable from {}", loaded.url);
            return Ok(loaded.bundle);
        }

        let bundle = ingest_bytes("stdin", read_stdin()?.as_bytes())
            .context("Failed to read bundle from stdin")?;
        Ok(Arc::new(bundle))
    }

    fn remote(&self) -> Option<BundleSource> {
        if let Some(url) = &self.url {
            return Some(BundleSource::url(url.as_str()));
        }
        self.gist
            .as_ref()
            .map(|id| BundleSource::gist(id.as_str(), self.gist_file.clone()))
    }
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read JSON from stdin")?;

    if buffer.trim().is_empty() {
        anyhow::bail!("No bundle given. Provide --file, --url, --gist, or pipe JSON via stdin.");
    }
    Ok(buffer)
}
