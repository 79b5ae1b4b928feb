//! Chorus CLI - one prompt, many personas.
//!
//! Terminal front end for the Chorus proxy. `ask` fans a single prompt out
//! to the selected personas, reveals the first pane live, and prints the
//! rest once every call has settled.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{Confirm, Input};

use chorus::{AttachedImage, PersonaRegistry, SubmissionOrchestrator, SurfaceManager};

mod api;
mod config;
mod render;

use api::ChorusClient;
use config::Config;
use render::{project_hidden_panes, TerminalSurface};

#[derive(Parser)]
#[command(name = "chorus")]
#[command(about = "One prompt, many personas", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to unlock the ask command
    Login,
    /// Log out and clear the session
    Logout,
    /// List the available personas
    Personas,
    /// Ask the selected personas a question
    Ask {
        /// The prompt to send (read interactively when omitted)
        prompt: Option<String>,

        /// Persona to ask; repeat for several, default is all of them
        #[arg(short = 'P', long = "persona")]
        personas: Vec<String>,

        /// Path to an image to attach
        #[arg(short, long)]
        image: Option<String>,
    },
    /// Show the current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Login => cmd_login(),
        Commands::Logout => cmd_logout(),
        Commands::Personas => cmd_personas(),
        Commands::Ask {
            prompt,
            personas,
            image,
        } => cmd_ask(prompt, personas, image).await,
        Commands::Config => cmd_config(),
    }
}

// ============================================
// Commands
// ============================================

/// Mirrors the original sign-in modal: any non-empty name and password are
/// accepted. The flag gates the UI only; the proxy holds the real
/// credential.
fn cmd_login() -> Result<()> {
    let mut config = Config::load()?;

    if config.session.is_authorized() {
        println!("Already logged in.");
        return Ok(());
    }

    let username: String = Input::new().with_prompt("Name").interact_text()?;
    let password: String = Input::new().with_prompt("Password").interact_text()?;

    if username.trim().is_empty() || password.trim().is_empty() {
        bail!("Please fill in all fields.");
    }

    config.session.log_in();
    config.save()?;

    println!("{} Logged in as {}", "✓".green(), username.trim());
    Ok(())
}

fn cmd_logout() -> Result<()> {
    let mut config = Config::load()?;
    config.session.log_out();
    config.save()?;

    println!("{} Logged out", "✓".green());
    Ok(())
}

fn cmd_personas() -> Result<()> {
    let registry = PersonaRegistry::builtin();

    println!("{}", "Available personas:".bold());
    for persona in registry.list() {
        println!("  {:<10} {}", persona.id.cyan(), persona.display_name);
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = Config::load()?;

    println!("{}", "Configuration:".bold());
    println!("  Path:       {:?}", Config::config_path()?);
    println!("  Proxy URL:  {}", config.base_url);
    println!("  Timeout:    {}s", config.request_timeout_secs);
    println!(
        "  Session:    {}",
        if config.session.is_authorized() {
            "logged in".green()
        } else {
            "logged out".dimmed()
        }
    );
    Ok(())
}

async fn cmd_ask(
    prompt: Option<String>,
    personas: Vec<String>,
    image: Option<String>,
) -> Result<()> {
    let mut config = Config::load()?;

    if !config.session.is_authorized() {
        bail!("Please log in first: chorus login");
    }

    if config.session.needs_consent_banner() {
        let accepted = Confirm::new()
            .with_prompt("This tool sends your prompts to a remote model. Continue?")
            .default(true)
            .interact()?;
        config.session.record_consent(accepted);
        config.save()?;
        if !accepted {
            bail!("Consent declined.");
        }
    }

    let registry = PersonaRegistry::builtin();
    let selected: Vec<String> = if personas.is_empty() {
        registry.list().iter().map(|p| p.id.clone()).collect()
    } else {
        personas.iter().map(|p| p.trim().to_lowercase()).collect()
    };

    let prompt = match prompt {
        Some(prompt) => prompt,
        None => Input::new().with_prompt("Prompt").interact_text()?,
    };

    let attached = match image {
        Some(path) => Some(read_image(Path::new(&path))?),
        None => None,
    };

    let client = Arc::new(ChorusClient::new(
        &config.base_url,
        Duration::from_secs(config.request_timeout_secs),
    ));
    let surface = Arc::new(SurfaceManager::new(Arc::new(TerminalSurface)));
    let orchestrator = SubmissionOrchestrator::new(registry, client, Arc::clone(&surface));

    let report = orchestrator
        .submit(&prompt, &selected, attached)
        .await
        .map_err(|err| anyhow::anyhow!("{err}"))?;

    surface.finish_reveals().await;
    println!();

    project_hidden_panes(&surface, orchestrator.registry(), &report);

    let failed = report.failed_count();
    if failed > 0 {
        println!();
        println!(
            "{}",
            format!("{failed} of {} personas failed", report.outcomes.len()).yellow()
        );
    }

    Ok(())
}

// ============================================
// Helper Functions
// ============================================

fn read_image(path: &Path) -> Result<AttachedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image {:?}", path))?;
    Ok(AttachedImage::new(mime_for_path(path), STANDARD.encode(bytes)))
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}
