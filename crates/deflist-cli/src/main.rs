mod view;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use deflist_config::Settings;
use deflist_engine::parsing::rope::{line, line_count, preview};
use deflist_engine::{LiveEngine, Span, TreeSitterOracle, render_markdown};
use tracing::debug;

#[derive(Parser)]
#[command(name = "deflist", version, about = "Definition lists for Markdown")]
struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a Markdown file to HTML with definition lists
    Render(RenderArgs),

    /// Print the blocks and decorations the live engine finds
    Scan(ScanArgs),

    /// Open a file in the terminal viewer
    View(ViewArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    file: PathBuf,

    /// Prepend a <style> element built from the settings
    #[arg(long)]
    css: bool,
}

#[derive(clap::Args)]
struct ScanArgs {
    file: PathBuf,

    /// First visible line (1-based)
    #[arg(long)]
    from_line: Option<usize>,

    /// Last visible line (1-based, inclusive)
    #[arg(long)]
    to_line: Option<usize>,
}

#[derive(clap::Args)]
struct ViewArgs {
    file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The viewer owns the terminal; log lines would land on top of it.
    if !matches!(cli.command, Command::View(_)) {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("deflist_engine=info".parse()?),
            )
            .init();
    }

    let settings = load_settings(cli.config.as_deref())?;
    match cli.command {
        Command::Render(args) => render(&args, &settings),
        Command::Scan(args) => scan(&args),
        Command::View(args) => view::run(&args.file, settings),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let loaded = match path {
        Some(path) => Settings::load_from_path(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load().context("loading settings")?,
    };
    Ok(loaded.unwrap_or_default())
}

fn render(args: &RenderArgs, settings: &Settings) -> Result<()> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    debug!(file = %args.file.display(), bytes = text.len(), css = args.css, "rendering");
    if args.css {
        println!("<style>\n{}</style>", settings.stylesheet());
    }
    print!("{}", render_markdown(&text));
    Ok(())
}

fn scan(args: &ScanArgs) -> Result<()> {
    let bytes = fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
    let mut engine = LiveEngine::<TreeSitterOracle>::from_bytes(&bytes)
        .with_context(|| format!("opening {}", args.file.display()))?;

    if args.from_line.is_some() || args.to_line.is_some() {
        let count = line_count(engine.rope());
        let first = args.from_line.unwrap_or(1);
        let last = args.to_line.unwrap_or(count);
        if first == 0 || first > last {
            bail!("invalid line range {first}..={last}");
        }
        let span = Span::new(line(engine.rope(), first).from, line(engine.rope(), last).to);
        engine.set_viewport([span]);
    }

    debug!(
        file = %args.file.display(),
        blocks = engine.blocks().len(),
        decorations = engine.decorations().len(),
        "scanned"
    );
    for block in engine.blocks() {
        let shape = match (block.is_special, block.is_definition_list()) {
            (true, _) => "special",
            (false, true) => "definition list",
            (false, false) => "prose",
        };
        println!("block {}..={} {shape}", block.first_line, block.last_line);
    }
    for d in engine.decorations() {
        println!(
            "{:>5} {:<18} {:>6}..{:<6} {:?}",
            d.line,
            d.style.class_name(),
            d.range.start,
            d.range.end,
            preview(engine.rope(), d.range, 40)
        );
    }
    Ok(())
}
