use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use dentmark::config::Config;
use dentmark::input::{AnnotationCanvas, SaveDispatch, SaveMode};
use dentmark::persistence::{PersistOutcome, PersistedAnnotationPayload, PersistenceManager};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "dentmark")]
#[command(version, about = "Annotate dental photos and produce report-ready images")]
struct Cli {
    /// Use this config file instead of ~/.config/dentmark/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available drawing tools and their styles
    Tools,

    /// Flatten a photo and its annotations into a PNG
    Render {
        /// Background photo (PNG, JPEG, WebP, GIF or BMP)
        #[arg(long, value_name = "PATH")]
        image: PathBuf,
        /// Annotation payload JSON
        #[arg(long, value_name = "PATH")]
        annotations: Option<PathBuf>,
        /// Where to write the PNG
        #[arg(long, short = 'o', value_name = "PATH")]
        output: PathBuf,
    },

    /// Summarise an annotation payload
    Inspect {
        /// Annotation payload JSON
        payload: PathBuf,
    },

    /// Save annotations and the flattened photo for a submission
    Save {
        #[arg(long, value_name = "ID")]
        submission: String,
        #[arg(long, value_name = "PATH")]
        image: PathBuf,
        #[arg(long, value_name = "PATH")]
        annotations: PathBuf,
        /// Submission store directory (overrides the config)
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
    },

    /// Generate a report for a saved submission
    Report {
        #[arg(long, value_name = "ID")]
        submission: String,
        /// Submission store directory (overrides the config)
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Tools => list_tools(&config),
        Command::Render {
            image,
            annotations,
            output,
        } => render(&config, &image, annotations.as_deref(), &output),
        Command::Inspect { payload } => inspect(&payload),
        Command::Save {
            submission,
            image,
            annotations,
            store,
        } => save(&config, &submission, &image, &annotations, store),
        Command::Report { submission, store } => report(&config, &submission, store),
    }
}

fn list_tools(config: &Config) -> Result<()> {
    let registry = config.tool_registry();
    for tool in registry.list_tools() {
        match tool.shape {
            Some(shape) => {
                let fill = tool
                    .style
                    .fill
                    .map(|c| c.to_hex())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<10} {:<10} {:<10} stroke {} width {} fill {}",
                    tool.id, tool.label, shape, tool.style.stroke, tool.style.stroke_width, fill
                );
            }
            None => println!("{:<10} {:<10} (no drawing)", tool.id, tool.label),
        }
    }
    Ok(())
}

fn read_payload(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read annotations from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse annotations from {}", path.display()))
}

fn load_canvas(
    config: &Config,
    submission: &str,
    image: &Path,
    annotations: Option<&Path>,
) -> Result<AnnotationCanvas> {
    let payload = annotations.map(read_payload).transpose()?;
    let image_bytes =
        fs::read(image).with_context(|| format!("Failed to read image {}", image.display()))?;

    let mut canvas = AnnotationCanvas::new(config.tool_registry(), config.canvas_settings());
    canvas
        .load_submission(submission, &image_bytes, payload.as_ref())
        .map_err(|e| anyhow!("Failed to load image {}: {e}", image.display()))?;
    Ok(canvas)
}

fn render(
    config: &Config,
    image: &Path,
    annotations: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let canvas = load_canvas(config, "render", image, annotations)?;
    let png = canvas.export_flattened()?;
    fs::write(output, &png)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if let Some((width, height)) = canvas.display_size() {
        println!(
            "Rendered {} annotation(s) onto {}x{} image: {}",
            canvas.annotations().len(),
            width,
            height,
            output.display()
        );
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let payload = PersistedAnnotationPayload::from_value(&read_payload(path)?);

    println!("{} annotation(s)", payload.annotations.len());
    for annotation in &payload.annotations {
        let style = annotation.style();
        match annotation.bounding_box() {
            Some(bounds) => println!(
                "- {} {} stroke {} at ({:.1}, {:.1}) size {:.1}x{:.1}",
                annotation.id(),
                annotation.kind(),
                style.stroke,
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height
            ),
            None => println!("- {} {}", annotation.id(), annotation.kind()),
        }
    }
    if let Some(recommendations) = &payload.recommendations {
        println!("Recommendations: {recommendations}");
    }
    if !payload.extra.is_empty() {
        let keys: Vec<_> = payload.extra.keys().map(String::as_str).collect();
        println!("Extra fields: {}", keys.join(", "));
    }
    Ok(())
}

/// Polls the manager from a blocking context until one outcome arrives.
fn wait_for_outcome(
    runtime: &tokio::runtime::Runtime,
    manager: &PersistenceManager,
) -> PersistOutcome {
    runtime.block_on(async {
        loop {
            if let Some(outcome) = manager.take_outcome().await {
                return outcome;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
}

fn store_dir(config: &Config, store: Option<PathBuf>) -> PathBuf {
    store.unwrap_or_else(|| config.storage.resolved_base_dir())
}

fn save(
    config: &Config,
    submission: &str,
    image: &Path,
    annotations: &Path,
    store: Option<PathBuf>,
) -> Result<()> {
    let mut canvas = load_canvas(config, submission, image, Some(annotations))?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let manager = PersistenceManager::new(runtime.handle(), store_dir(config, store));

    if canvas.save(&manager, SaveMode::Force)? == SaveDispatch::Skipped {
        return Ok(());
    }
    let outcome = wait_for_outcome(&runtime, &manager);
    canvas.apply_outcome(&outcome);

    match outcome {
        PersistOutcome::Saved { status, .. } => {
            println!(
                "Saved {} annotation(s) for {submission} (status: {status})",
                canvas.annotations().len()
            );
            Ok(())
        }
        PersistOutcome::SaveFailed { message, .. } => bail!(message),
        other => bail!("Unexpected outcome: {other:?}"),
    }
}

fn report(config: &Config, submission: &str, store: Option<PathBuf>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let manager = PersistenceManager::new(runtime.handle(), store_dir(config, store));
    manager.request_report(submission)?;

    match wait_for_outcome(&runtime, &manager) {
        PersistOutcome::Reported { reference, .. } => {
            println!("{}", reference.url);
            println!("Status: {}", reference.status);
            Ok(())
        }
        PersistOutcome::ReportFailed { message, .. } => bail!(message),
        other => bail!("Unexpected outcome: {other:?}"),
    }
}
