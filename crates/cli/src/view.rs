use anyhow::{Context as AnyhowContext, Result};
use clap::Args;
use std::path::Path;
use stixview_graph::{LayoutKind, ViewerOptions};

/// Visibility and layout flags; they extend the `--config` file
#[derive(Args, Debug, Default)]
pub(crate) struct ViewArgs {
    /// Only show these objects (repeatable)
    #[arg(long = "highlight", value_name = "ID")]
    highlight: Vec<String>,

    /// Never show these objects (repeatable)
    #[arg(long = "hide", value_name = "ID")]
    hide: Vec<String>,

    /// Show marking definitions
    #[arg(long)]
    show_markings: bool,

    /// Resolve dangling references into placeholder nodes
    #[arg(long)]
    show_idrefs: bool,

    /// Layout: cola|euler|cose-bilkent|klay|dagre
    #[arg(long)]
    layout: Option<LayoutKind>,
}

impl ViewArgs {
    pub(crate) fn options(&self, config: Option<&Path>) -> Result<ViewerOptions> {
        let mut options = match config {
            Some(path) => ViewerOptions::load(path)
                .with_context(|| format!("Invalid config {}", path.display()))?,
            None => ViewerOptions::default(),
        };

        options.highlighted_objects.extend(self.highlight.iter().cloned());
        options.hidden_objects.extend(self.hide.iter().cloned());
        options.show_markings |= self.show_markings;
        options.show_idrefs |= self.show_idrefs;
        if let Some(layout) = self.layout {
            options.layout = layout;
        }

        options.validate().context("Invalid viewer options")?;
        Ok(options)
    }
}
