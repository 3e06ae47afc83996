//! draftdesk - content authoring workspace.
//!
//! Drafts, adapts, saves, and browses content for an organization from the
//! command line.

#![allow(clippy::single_match_else)]

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use draftdesk::core::{ContentStatus, ContentType, Organization, WorkspaceContext};
use draftdesk::gateway::GenerationOptions;
use draftdesk::media::{PollOutcome, VisualKind, VisualRequest};
use draftdesk::workspace::{Action, Outcome, Services, Workspace, WorkspaceConfig};
use draftdesk::Config;

/// Content authoring workspace
#[derive(Parser)]
#[command(name = "draftdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with the organization, framework and intelligence context
    #[arg(long, global = true)]
    context: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new content item
    New {
        /// Content type (see `draftdesk types`)
        content_type: ContentType,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Generate a body for a content type
    Generate {
        /// Content type (see `draftdesk types`)
        content_type: ContentType,

        /// Extra instructions for the generator
        #[arg(short, long, default_value = "")]
        prompt: String,

        /// Tone (defaults to the configured tone)
        #[arg(short, long)]
        tone: Option<String>,

        /// Target audience (repeatable)
        #[arg(short, long)]
        audience: Vec<String>,

        /// Weave in supporting intelligence data
        #[arg(long)]
        include_data: bool,
    },

    /// Adapt a body for several audiences
    Adapt {
        /// File holding the source text (reads stdin if omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Target audience (repeatable)
        #[arg(short, long, required = true)]
        audience: Vec<String>,

        /// Content type of the source text
        #[arg(long, default_value = "blog-post")]
        content_type: ContentType,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Save content to the library
    Save {
        /// Content type (see `draftdesk types`)
        content_type: ContentType,

        /// Title (defaults to the generated one)
        #[arg(short, long)]
        title: Option<String>,

        /// File holding the body (reads stdin if omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Save as a draft
        #[arg(long)]
        draft: bool,
    },

    /// Browse the content library
    Library {
        #[command(subcommand)]
        operation: LibraryOperation,
    },

    /// Generate an image, video or presentation
    Visual {
        /// Visual kind (image, video, presentation)
        kind: VisualKind,

        /// Visual style
        #[arg(long, default_value = "professional")]
        style: String,

        /// Aspect ratio
        #[arg(long, default_value = "16:9")]
        aspect_ratio: String,

        /// Video length in seconds
        #[arg(long)]
        duration: Option<u32>,

        /// Description of the visual
        #[arg(short, long, default_value = "")]
        prompt: String,

        /// Wait for asynchronous jobs to finish
        #[arg(short, long)]
        wait: bool,
    },

    /// List content types
    Types,

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum LibraryOperation {
    /// List recent items, templates and drafts
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show items grouped by folder
    Folders,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Types => cmd_types(),
        Commands::Config { path } => cmd_config(path),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
        command => {
            let config = Config::load()?;
            let context = load_context(&config, cli.context.as_deref())?;
            let mut workspace = Workspace::new(
                WorkspaceConfig::from(&config),
                context,
                Services::from_config(&config)?,
            );

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run(&mut workspace, command))
        }
    }
}

async fn run(workspace: &mut Workspace, command: Commands) -> Result<()> {
    match command {
        Commands::New { content_type, format } => cmd_new(workspace, content_type, &format).await,
        Commands::Generate { content_type, prompt, tone, audience, include_data } => {
            let options = GenerationOptions::new(tone.unwrap_or_default())
                .with_audiences(audience)
                .with_data(include_data);
            cmd_generate(workspace, content_type, options, &prompt).await
        }
        Commands::Adapt { file, audience, content_type, format } => {
            cmd_adapt(workspace, file.as_deref(), audience, content_type, &format).await
        }
        Commands::Save { content_type, title, file, draft } => {
            cmd_save(workspace, content_type, title, file.as_deref(), draft).await
        }
        Commands::Library { operation } => cmd_library(workspace, operation).await,
        Commands::Visual { kind, style, aspect_ratio, duration, prompt, wait } => {
            let mut request = VisualRequest::new(kind);
            request.style = style;
            request.aspect_ratio = aspect_ratio;
            request.prompt = prompt;
            if duration.is_some() {
                request.duration = duration;
            }
            cmd_visual(workspace, request, wait).await
        }
        Commands::Types | Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}

/// Build the context from a JSON file, or from the configured organization.
fn load_context(config: &Config, path: Option<&Path>) -> Result<WorkspaceContext> {
    if let Some(path) = path {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read context file {}", path.display()))?;
        return serde_json::from_str(&content)
            .with_context(|| format!("Invalid context file {}", path.display()));
    }

    Ok(WorkspaceContext::new(Organization::new(
        &config.general.organization_id,
        &config.general.organization_name,
    )))
}

/// Read a body from a file, or from stdin.
fn read_body(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut body = String::new();
            io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

/// Start a new content item.
async fn cmd_new(workspace: &mut Workspace, content_type: ContentType, format: &str) -> Result<()> {
    workspace.dispatch(Action::SelectType(content_type)).await?;
    let item = workspace.current().context("No content item is open")?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(item)?),
        _ => {
            println!("Created: {}", item.title);
            println!("  Type:   {}", item.content_type);
            println!("  Status: {}", item.status);
            println!("  Id:     {}", item.id);
        }
    }

    Ok(())
}

/// Generate a body.
async fn cmd_generate(
    workspace: &mut Workspace,
    content_type: ContentType,
    options: GenerationOptions,
    instructions: &str,
) -> Result<()> {
    workspace.dispatch(Action::SelectType(content_type)).await?;
    let outcome = workspace
        .dispatch(Action::Generate { options, instructions: instructions.to_string() })
        .await?;

    let item = workspace.current().context("No content item is open")?;
    println!("{}", item.body);

    if outcome != (Outcome::Generated { succeeded: true }) {
        anyhow::bail!("Content generation failed");
    }

    eprintln!("{} words, {} min read", item.metadata.word_count, item.metadata.reading_time);
    Ok(())
}

/// Adapt a body for audiences.
async fn cmd_adapt(
    workspace: &mut Workspace,
    file: Option<&Path>,
    audiences: Vec<String>,
    content_type: ContentType,
    format: &str,
) -> Result<()> {
    let body = read_body(file)?;
    let requested = audiences.len();

    workspace.dispatch(Action::SelectType(content_type)).await?;
    workspace.dispatch(Action::SetBody(body)).await?;

    let Outcome::Adapted { added } = workspace.dispatch(Action::Adapt { audiences }).await? else {
        anyhow::bail!("Unexpected outcome from adaptation");
    };
    if added != requested {
        anyhow::bail!("Adaptation failed for {requested} audience(s)");
    }

    let versions = &workspace.current().context("No content item is open")?.versions;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(versions)?),
        _ => {
            for version in versions {
                println!("=== {} ===", version.audience);
                println!("{}\n", version.body);
            }
        }
    }

    Ok(())
}

/// Save to the library.
async fn cmd_save(
    workspace: &mut Workspace,
    content_type: ContentType,
    title: Option<String>,
    file: Option<&Path>,
    draft: bool,
) -> Result<()> {
    let body = read_body(file)?;

    workspace.dispatch(Action::SelectType(content_type)).await?;
    if let Some(title) = title {
        workspace.dispatch(Action::SetTitle(title)).await?;
    }
    workspace.dispatch(Action::SetBody(body)).await?;
    if draft {
        workspace.dispatch(Action::SetStatus(ContentStatus::Draft)).await?;
    }

    let Outcome::Saved { receipt, queued } = workspace.dispatch(Action::Save).await? else {
        anyhow::bail!("Unexpected outcome from save");
    };

    let item = workspace.current().context("No content item is open")?;
    println!("Saved: {}", item.title);
    println!("  Status:       {}", item.status);
    println!("  Words:        {}", item.metadata.word_count);
    println!("  Reading time: {} min", item.metadata.reading_time);
    if let Some(location) = receipt.location {
        println!("  Location:     {location}");
    }
    if queued {
        println!("  Queued for review");
    }

    Ok(())
}

/// Browse the library.
async fn cmd_library(workspace: &mut Workspace, operation: LibraryOperation) -> Result<()> {
    let Outcome::Refreshed { stale, .. } = workspace.dispatch(Action::RefreshLibrary).await? else {
        anyhow::bail!("Unexpected outcome from library refresh");
    };
    if stale {
        anyhow::bail!("Failed to load the content library");
    }

    let library = workspace.library();
    match operation {
        LibraryOperation::List { format } => {
            let snapshot = library.snapshot();
            match format.as_str() {
                "json" => {
                    let json = serde_json::json!({
                        "recent": snapshot.recent,
                        "templates": snapshot.templates,
                        "drafts": snapshot.drafts,
                    });
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
                _ => {
                    for (heading, rows) in [
                        ("Recent", &snapshot.recent),
                        ("Templates", &snapshot.templates),
                        ("Drafts", &snapshot.drafts),
                    ] {
                        println!("{heading} ({}):", rows.len());
                        for row in rows {
                            println!("  {} [{}] {}", row.id, row.content_type, row.title);
                        }
                    }
                    println!("\nTotal: {} items", snapshot.len());
                }
            }
        }
        LibraryOperation::Folders => {
            for (folder, rows) in library.folders().iter() {
                println!("{folder} ({}):", rows.len());
                for row in rows {
                    println!("  {} {}", row.id, row.title);
                }
            }
        }
    }

    Ok(())
}

/// Generate a visual.
async fn cmd_visual(workspace: &mut Workspace, request: VisualRequest, wait: bool) -> Result<()> {
    match workspace.dispatch(Action::RequestVisual(request)).await? {
        Outcome::Images(urls) => {
            for url in urls {
                println!("{url}");
            }
        }
        Outcome::VisualJob(job_id) => {
            if !wait {
                println!("Job started: {job_id}");
                return Ok(());
            }

            let handle = workspace.take_visual_job().context("Visual job was not started")?;
            eprintln!("Waiting for job {job_id}...");
            match handle.wait().await {
                PollOutcome::Completed(status) => {
                    println!("{}", status.url.unwrap_or_else(|| "Job completed".to_string()));
                }
                PollOutcome::Failed(status) => {
                    anyhow::bail!(
                        "Visual job failed: {}",
                        status.error.unwrap_or_else(|| "unknown error".to_string())
                    );
                }
                PollOutcome::TimedOut => println!("Job {job_id} is still running"),
                PollOutcome::Stopped => println!("Stopped waiting for job {job_id}"),
            }
        }
        _ => {}
    }

    Ok(())
}

/// List content types.
fn cmd_types() -> Result<()> {
    for content_type in ContentType::ALL {
        let marker = if content_type.is_visual() { " (visual)" } else { "" };
        println!("{:<20} {}{}", content_type.id(), content_type.display_name(), marker);
    }
    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "draftdesk", &mut io::stdout());
}

/// Show configuration.
fn cmd_config(show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::global_config_path() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = Config::load()?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");

    Ok(())
}
