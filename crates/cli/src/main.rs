use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use source::SourceArgs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use stixview_graph::{
    to_json_pretty, Bundle, Element, GraphBuilder, GraphModel, LayoutSpec, NodeDetails,
    ViewerOptions,
};
use view::ViewArgs;

mod source;
mod view;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "stixview")]
#[command(about = "Turn STIX2 bundles into renderable graphs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Viewer options file (JSON or TOML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the layout and element list for a bundle
    Render(RenderArgs),

    /// Print what the viewer shows for one node
    Details(DetailsArgs),

    /// Write the bundle to disk as indented JSON
    Export(ExportArgs),
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    view: ViewArgs,

    /// Print only the element list
    #[arg(long)]
    elements_only: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct DetailsArgs {
    /// Node id (object id, or the missing id of a placeholder)
    id: String,

    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    view: ViewArgs,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Directory to write into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Serialize)]
struct RenderOutput {
    layout: LayoutSpec,
    elements: Vec<Element>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Render(args) => run_render(args, config).await?,
        Commands::Details(args) => run_details(args, config).await?,
        Commands::Export(args) => run_export(args).await?,
    }

    Ok(())
}

fn build_model(bundle: &Bundle, options: &ViewerOptions) -> GraphModel {
    let builder = GraphBuilder::new(options.style_table());
    builder.build(bundle, &options.build_options())
}

/// Build the graph and print it for the renderer
async fn run_render(args: RenderArgs, config: Option<&Path>) -> Result<()> {
    let options = args.view.options(config)?;
    let bundle = args.source.load().await?;
    let model = build_model(&bundle, &options);

    let elements = model.elements();
    let output = if args.elements_only {
        serialize(&elements, args.pretty)?
    } else {
        let output = RenderOutput {
            layout: options.layout.spec(),
            elements,
        };
        serialize(&output, args.pretty)?
    };
    print_stdout(&output)
}

async fn run_details(args: DetailsArgs, config: Option<&Path>) -> Result<()> {
    let options = args.view.options(config)?;
    let bundle = args.source.load().await?;
    let model = build_model(&bundle, &options);

    let details = NodeDetails::for_node(&model, &args.id)
        .with_context(|| format!("No node {} in the rendered graph", args.id))?;
    print_stdout(&to_json_pretty(&details)?)
}

async fn run_export(args: ExportArgs) -> Result<()> {
    let bundle = args.source.load().await?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;
    let path = args.out_dir.join(export_file_name(&bundle));
    fs::write(&path, to_json_pretty(bundle.as_ref())?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("Bundle written to {}", path.display());
    print_stdout(&serde_json::to_string(&serde_json::json!({
        "path": path.display().to_string(),
        "objects": bundle.objects.len(),
    }))?)
}

fn serialize<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        Ok(to_json_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

/// `<bundle id>.json`, or `bundle.json` when the id is missing or unusable as a file name
fn export_file_name(bundle: &Bundle) -> String {
    match bundle.id.as_deref() {
        Some(id)
            if !id.is_empty()
                && !id.starts_with('.')
                && !id.contains(|c: char| c == '/' || c == '\\') =>
        {
            format!("{id}.json")
        }
        _ => "bundle.json".to_string(),
    }
}
