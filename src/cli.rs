use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Parser};

#[cfg(feature = "server")]
use crate::serve::{ServeArgs, run_serve};
use crate::*;

#[derive(Debug, Parser)]
#[command(
    name = "layerboard",
    about = "Validate and summarise layerboard diagram documents."
)]
pub struct InspectArgs {
    /// Document to inspect. Use '-' to read from stdin.
    #[arg(short = 'i', long = "input")]
    pub input: Option<String>,

    /// JSON file with editor settings.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the normalised document instead of a summary.
    #[arg(long = "json", action = ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Debug, Parser)]
#[command(name = "layerboard new", about = "Write an empty diagram document.")]
pub struct NewArgs {
    /// Where to write the document. Use '-' or omit for stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// Replace the file if it already exists.
    #[arg(long, action = ArgAction::SetTrue)]
    pub force: bool,
}

enum InputSource {
    Stdin,
    File(PathBuf),
}

fn parse_input(input: Option<&str>) -> Result<InputSource> {
    match input {
        Some("-") | None => Ok(InputSource::Stdin),
        Some(path_str) => {
            let path = PathBuf::from(path_str);
            if !path.exists() {
                return Err(anyhow!("input file '{path_str}' does not exist"));
            }
            Ok(InputSource::File(path))
        }
    }
}

fn load_document(source: &InputSource) -> Result<String> {
    match source {
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read document from stdin")?;
            Ok(buffer)
        }
        InputSource::File(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
    }
}

pub fn run_inspect(args: InspectArgs) -> Result<()> {
    let config = EditorConfig::load_or_default(args.config.as_deref())?;
    let source = parse_input(args.input.as_deref())?;
    let contents = load_document(&source)?;

    let mut editor = Editor::new(config);
    editor.import_document(&contents)?;

    if args.json {
        println!("{}", editor.export_document()?.to_json()?);
        return Ok(());
    }

    let diagram = editor.store().current()?;
    let bounds = diagram.bounds();

    let name = match &source {
        InputSource::Stdin => "<stdin>".to_string(),
        InputSource::File(path) => path.display().to_string(),
    };
    println!("document: {name}");
    println!("nodes: {}", diagram.node_count());
    println!("edges: {}", diagram.edge_count());
    println!(
        "bounds: ({}, {}) to ({}, {})",
        bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
    );

    let bidirectional = diagram.edges().iter().filter(|edge| edge.bidirectional).count();
    if bidirectional > 0 {
        println!("bidirectional edges: {bidirectional}");
    }

    Ok(())
}

pub fn run_new(args: NewArgs) -> Result<()> {
    let contents = ExportDocument::default().to_json()?;

    match args.output.as_deref() {
        None | Some("-") => {
            println!("{contents}");
        }
        Some(path_str) => {
            let path = PathBuf::from(path_str);
            if path.exists() && !args.force {
                bail!("'{}' already exists (use --force to replace it)", path.display());
            }
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create directory '{}'", parent.display())
                })?;
            }
            fs::write(&path, format!("{contents}\n"))
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            println!("Created {}", path.display());
        }
    }

    Ok(())
}

fn sub_args(args: &[String]) -> impl Iterator<Item = String> + '_ {
    std::iter::once(args[0].clone()).chain(args.iter().skip(2).cloned())
}

#[cfg(feature = "server")]
pub async fn dispatch() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("serve") => run_serve(ServeArgs::parse_from(sub_args(&args))).await,
        Some("new") => run_new(NewArgs::parse_from(sub_args(&args))),
        Some("inspect") => run_inspect(InspectArgs::parse_from(sub_args(&args))),
        _ => run_inspect(InspectArgs::parse_from(args)),
    }
}

#[cfg(not(feature = "server"))]
pub fn dispatch_sync() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("serve") => Err(anyhow!(
            "'serve' command requires the 'server' feature to be enabled"
        )),
        Some("new") => run_new(NewArgs::parse_from(sub_args(&args))),
        Some("inspect") => run_inspect(InspectArgs::parse_from(sub_args(&args))),
        _ => run_inspect(InspectArgs::parse_from(args)),
    }
}
