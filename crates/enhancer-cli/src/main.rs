//! Prompt Enhancer CLI
//!
//! Turn rough prompts into structured ones with Gemini, and manage the
//! history, templates and settings kept between runs.

mod config;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use dialoguer::{Confirm, Input, Password};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use config::Config;
use prompt_enhancer::adapters::{FileStore, GeminiEnhancer, MemoryStore};
use prompt_enhancer::backup::{self, FieldCheck, FieldOutcome, ImportPlan, BACKUP_FILE_NAME};
use prompt_enhancer::domain::{find_by_prefix, Identified, Lookup};
use prompt_enhancer::{
    GeminiModel, HistoryEntry, KeyValueStore, Language, Outcome, PromptTemplate,
    RequestController, Settings, Store,
};

#[derive(Parser)]
#[command(name = "prompt-enhancer")]
#[command(about = "Prompt Enhancer - rewrite rough prompts into structured ones", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    storage: StorageArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StorageArgs {
    /// Data directory (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep all state in memory for this run only
    #[arg(long, global = true)]
    ephemeral: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance a prompt
    Enhance {
        /// Prompt text (or use -f / -t)
        prompt: Option<String>,
        /// Read the prompt from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Use a saved template as the prompt (id or id prefix)
        #[arg(short, long)]
        template: Option<String>,
        /// Show model and history id on stderr
        #[arg(long)]
        verbose: bool,
    },

    /// Past enhancements
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Manage prompt templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Model, system instruction and language
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Export history, templates and settings to a JSON file
    Export {
        /// Output path
        #[arg(short, long, default_value = BACKUP_FILE_NAME)]
        output: PathBuf,
    },

    /// Import a JSON backup (replaces the fields it contains)
    Import {
        /// Backup file
        path: PathBuf,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Store the Gemini API key
    Login {
        /// API key (will prompt if not provided)
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List past enhancements, most recent first
    List {
        /// Max entries
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show one entry in full
    Show {
        /// Entry id or id prefix
        id: String,
    },
    /// Delete one entry
    Delete {
        /// Entry id or id prefix
        id: String,
    },
    /// Delete all entries
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// List templates
    List,
    /// Show a template in full
    Show {
        /// Template id or id prefix
        id: String,
    },
    /// Add a template
    Add {
        /// Display title
        #[arg(long)]
        title: String,
        /// Template body (or use -f)
        #[arg(long)]
        prompt: Option<String>,
        /// Read the body from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Edit a template, keeping its id
    Edit {
        /// Template id or id prefix
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New body
        #[arg(long)]
        prompt: Option<String>,
        /// Read the new body from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Delete a template
    Delete {
        /// Template id or id prefix
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show current settings
    Show,
    /// Change settings (unspecified fields keep their value)
    Set {
        /// gemini-2.5-pro or gemini-2.5-flash
        #[arg(short, long)]
        model: Option<GeminiModel>,
        /// it or en
        #[arg(short, long)]
        language: Option<Language>,
        /// System instruction text
        #[arg(short, long)]
        instruction: Option<String>,
        /// Read the system instruction from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Reset the system instruction to the built-in default
    RestoreDefault,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Enhance { prompt, file, template, verbose } => {
            cmd_enhance(&cli.storage, prompt, file, template, verbose).await
        }
        Commands::History { action } => cmd_history(&cli.storage, action),
        Commands::Template { action } => cmd_template(&cli.storage, action),
        Commands::Settings { action } => cmd_settings(&cli.storage, action),
        Commands::Export { output } => cmd_export(&cli.storage, output),
        Commands::Import { path, yes } => cmd_import(&cli.storage, path, yes),
        Commands::Login { key } => cmd_login(key),
        Commands::Config => cmd_config(&cli.storage),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_backing(config: &Config, storage: &StorageArgs) -> Result<Arc<dyn KeyValueStore>> {
    if storage.ephemeral {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let dir = match &storage.data_dir {
        Some(dir) => dir.clone(),
        None => config.resolve_data_dir()?,
    };
    Ok(Arc::new(
        FileStore::new(dir).with_quota(config.storage_quota_bytes),
    ))
}

fn open_store(storage: &StorageArgs) -> Result<(Config, Store)> {
    let config = Config::load()?;
    let store = Store::open(open_backing(&config, storage)?);
    Ok((config, store))
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_enhance(
    storage: &StorageArgs,
    prompt: Option<String>,
    file: Option<PathBuf>,
    template: Option<String>,
    verbose: bool,
) -> Result<()> {
    let (config, store) = open_store(storage)?;
    let api_key = config
        .resolve_api_key()
        .context("No API key. Run 'prompt-enhancer login' or set GEMINI_API_KEY.")?;

    let provider = GeminiEnhancer::new(api_key).with_base_url(&config.base_url);
    let controller = RequestController::new(Arc::new(provider), &store)
        .with_timeout(Duration::from_secs(config.request_timeout_secs));

    let prompt_text = match (prompt, file, template) {
        (Some(p), None, None) => p,
        (None, Some(f), None) => fs::read_to_string(&f)
            .with_context(|| format!("Failed to read file: {}", f.display()))?,
        (None, None, Some(t)) => {
            let selected = select(&store.templates.templates(), &t, "template")?;
            controller.load_template();
            selected.prompt
        }
        (None, None, None) => Input::new()
            .with_prompt("Prompt")
            .interact_text()
            .context("Failed to read input")?,
        _ => bail!("Specify only one of PROMPT, --file or --template"),
    };

    if prompt_text.trim().is_empty() {
        bail!("Prompt cannot be empty.");
    }

    let settings = store.settings.current();
    eprint!("{} ", format!("Enhancing with {}...", settings.model).dimmed());

    let outcome = tokio::select! {
        outcome = controller.enhance(&prompt_text) => outcome,
        _ = tokio::signal::ctrl_c() => {
            controller.cancel();
            eprintln!("{}", "cancelled".yellow());
            return Ok(());
        }
    };

    match outcome {
        Outcome::Enhanced(entry) => {
            eprintln!("{}", "done".green());
            if verbose {
                eprintln!(
                    "{} {} ({})",
                    "Saved to history as".dimmed(),
                    short_id(&entry.id).cyan(),
                    settings.model
                );
                eprintln!("{}", "---".dimmed());
            }
            // stdout stays clean for piping
            println!("{}", entry.enhanced_prompt);
            Ok(())
        }
        Outcome::Failed(err) => {
            eprintln!("{}", "failed".red());
            bail!("{}", err)
        }
        Outcome::Ignored | Outcome::Stale => {
            eprintln!();
            bail!("Request was not completed")
        }
    }
}

fn cmd_history(storage: &StorageArgs, action: HistoryAction) -> Result<()> {
    let (_, store) = open_store(storage)?;

    match action {
        HistoryAction::List { limit } => {
            let entries = store.history.entries();
            if entries.is_empty() {
                println!("No history yet.");
                println!("\n{}", "Enhance a prompt with:".dimmed());
                println!("  prompt-enhancer enhance \"<your prompt>\"");
                return Ok(());
            }

            println!("{} ({} total)", "History:".bold(), entries.len());
            for entry in entries.iter().take(limit) {
                println!(
                    "  {} {} {}",
                    short_id(&entry.id).cyan(),
                    format_timestamp(entry).dimmed(),
                    truncate_string(&single_line(&entry.original_prompt), 60)
                );
            }
        }

        HistoryAction::Show { id } => {
            let entry = select(&store.history.entries(), &id, "history entry")?;
            println!("{} {}", "Id:".bold(), entry.id);
            println!("{} {}", "Created:".bold(), format_timestamp(&entry));
            println!("\n{}\n{}", "Original prompt:".bold(), entry.original_prompt);
            println!("\n{}\n{}", "Enhanced prompt:".bold(), entry.enhanced_prompt);
        }

        HistoryAction::Delete { id } => {
            let entry = select(&store.history.entries(), &id, "history entry")?;
            store.history.remove_by_id(&entry.id);
            println!("{} History entry {} deleted", "✓".green(), short_id(&entry.id));
        }

        HistoryAction::Clear { yes } => {
            if store.history.is_empty() {
                println!("History is already empty.");
                return Ok(());
            }
            let count = store.history.len();
            if !yes && !confirm(&format!("Delete all {} history entries?", count))? {
                println!("Aborted.");
                return Ok(());
            }
            store.history.clear();
            println!("{} Cleared {} history entries", "✓".green(), count);
        }
    }

    Ok(())
}

fn cmd_template(storage: &StorageArgs, action: TemplateAction) -> Result<()> {
    let (_, store) = open_store(storage)?;

    match action {
        TemplateAction::List => {
            let templates = store.templates.templates();
            if templates.is_empty() {
                println!("No templates.");
                println!("\n{}", "Add one with:".dimmed());
                println!("  prompt-enhancer template add --title <TITLE> --prompt <TEXT>");
                return Ok(());
            }

            println!("{}", "Templates:".bold());
            for template in &templates {
                println!("  {} {}", short_id(&template.id).cyan(), template.title);
            }
        }

        TemplateAction::Show { id } => {
            let template = select(&store.templates.templates(), &id, "template")?;
            println!("{} {}", "Id:".bold(), template.id);
            println!("{} {}", "Title:".bold(), template.title);
            println!("\n{}", template.prompt);
        }

        TemplateAction::Add { title, prompt, file } => {
            let body = read_text_arg(prompt, file, "Template prompt")?;
            let template = PromptTemplate::new(&title, &body).context("Template rejected")?;
            let id = template.id.clone();
            store.templates.add(template);
            println!("{} Template '{}' added ({})", "✓".green(), title.trim(), short_id(&id));
        }

        TemplateAction::Edit { id, title, prompt, file } => {
            let current = select(&store.templates.templates(), &id, "template")?;
            let body = match (prompt, file) {
                (None, None) => current.prompt.clone(),
                (prompt, file) => read_text_arg(prompt, file, "Template prompt")?,
            };
            let title = title.unwrap_or_else(|| current.title.clone());

            let edited = current.edited(&title, &body).context("Template rejected")?;
            store.templates.update(edited);
            println!("{} Template '{}' updated", "✓".green(), title.trim());
        }

        TemplateAction::Delete { id, yes } => {
            let template = select(&store.templates.templates(), &id, "template")?;
            if !yes && !confirm(&format!("Delete template '{}'?", template.title))? {
                println!("Aborted.");
                return Ok(());
            }
            store.templates.remove_by_id(&template.id);
            println!("{} Template '{}' deleted", "✓".green(), template.title);
        }
    }

    Ok(())
}

fn cmd_settings(storage: &StorageArgs, action: SettingsAction) -> Result<()> {
    let (_, store) = open_store(storage)?;

    match action {
        SettingsAction::Show => print_settings(&store.settings.current()),

        SettingsAction::Set { model, language, instruction, file } => {
            let current = store.settings.current();
            let system_instruction = match (instruction, file) {
                (None, None) => current.system_instruction.clone(),
                (instruction, file) => read_text_arg(instruction, file, "System instruction")?,
            };
            if system_instruction.trim().is_empty() {
                bail!("System instruction cannot be empty");
            }

            let saved = store.settings.save(Settings {
                model: model.unwrap_or(current.model),
                system_instruction,
                language: language.unwrap_or(current.language),
            });
            println!("{} Settings saved", "✓".green());
            print_settings(&saved);
        }

        SettingsAction::RestoreDefault => {
            store.settings.restore_default_instruction();
            println!("{} System instruction restored to default", "✓".green());
        }
    }

    Ok(())
}

fn cmd_export(storage: &StorageArgs, output: PathBuf) -> Result<()> {
    let (_, store) = open_store(storage)?;

    let document = backup::export(&store).context("Failed to export data")?;
    fs::write(&output, document)
        .with_context(|| format!("Failed to write backup to {}", output.display()))?;

    println!(
        "{} Exported {} history entries and {} templates to {}",
        "✓".green(),
        store.history.len(),
        store.templates.len(),
        output.display()
    );
    Ok(())
}

fn cmd_import(storage: &StorageArgs, path: PathBuf, yes: bool) -> Result<()> {
    let (_, store) = open_store(storage)?;

    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read backup file: {}", path.display()))?;

    let report = backup::import(&store, &text, |plan| {
        describe_plan(plan);
        if plan.is_empty() {
            return false;
        }
        yes || confirm("Importing will overwrite the fields above. Continue?").unwrap_or(false)
    })
    .context("Failed to import data")?;

    let Some(report) = report else {
        println!("No changes made.");
        return Ok(());
    };

    println!("{} Import complete", "✓".green());
    for (field, outcome) in [
        ("history", &report.history),
        ("templates", &report.templates),
        ("settings", &report.settings),
    ] {
        match outcome {
            FieldOutcome::Applied(count) => println!("  {} {} ({})", "✓".green(), field, count),
            FieldOutcome::Missing => println!("  {} {} (not in file)", "-".dimmed(), field),
            FieldOutcome::Rejected(reason) => {
                println!("  {} {} skipped: {}", "✗".yellow(), field, reason.dimmed())
            }
        }
    }
    Ok(())
}

fn cmd_login(key: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    let api_key = match key {
        Some(k) => k,
        None => Password::new()
            .with_prompt("Gemini API Key")
            .interact()
            .context("Failed to read API key")?,
    };
    if api_key.trim().is_empty() {
        bail!("API key cannot be empty");
    }

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("{} API key saved to {:?}", "✓".green(), Config::config_path()?);
    Ok(())
}

fn cmd_config(storage: &StorageArgs) -> Result<()> {
    let (config, store) = open_store(storage)?;

    let key_source = if Config::env_api_key().is_some() {
        "Set (environment)".green()
    } else if config.api_key.is_some() {
        "Set".green()
    } else {
        "Not set".red()
    };

    println!("{}", "Configuration:".bold());
    println!("  Path: {:?}", Config::config_path()?);
    println!("  Base URL: {}", config.base_url);
    println!("  API Key: {}", key_source);
    println!("  Data: {}", store.location().cyan());
    println!("  Request timeout: {}s", config.request_timeout_secs);
    println!("  Storage quota: {} bytes", config.storage_quota_bytes);

    Ok(())
}

// ============================================
// Helpers
// ============================================

fn select<T: Identified + Clone>(items: &[T], id: &str, kind: &str) -> Result<T> {
    match find_by_prefix(items, id) {
        Lookup::Found(item) => Ok(item.clone()),
        Lookup::NotFound => bail!("No {} matches '{}'", kind, id),
        Lookup::Ambiguous(n) => bail!("'{}' matches {} {}s; use a longer id", id, n, kind),
    }
}

fn confirm(question: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

/// Text from an inline argument, a file, or interactive input
fn read_text_arg(inline: Option<String>, file: Option<PathBuf>, label: &str) -> Result<String> {
    match (inline, file) {
        (Some(text), None) => Ok(text),
        (None, Some(f)) => fs::read_to_string(&f)
            .with_context(|| format!("Failed to read file: {}", f.display())),
        (Some(_), Some(_)) => bail!("Cannot specify both text and --file"),
        (None, None) => Input::new()
            .with_prompt(label)
            .interact_text()
            .context("Failed to read input"),
    }
}

fn describe_plan(plan: &ImportPlan) {
    fn line<T>(field: &str, check: &FieldCheck<T>, count: impl Fn(&T) -> usize) {
        match check {
            FieldCheck::Valid(value) => {
                println!("  {} {} ({} to import)", "•".cyan(), field, count(value))
            }
            FieldCheck::Missing => println!("  {} {} (not in file, kept)", "-".dimmed(), field),
            FieldCheck::Invalid(reason) => println!(
                "  {} {} (malformed, kept): {}",
                "✗".yellow(),
                field,
                reason.dimmed()
            ),
        }
    }

    println!("{}", "Backup contents:".bold());
    line("history", &plan.history, Vec::len);
    line("templates", &plan.templates, Vec::len);
    line("settings", &plan.settings, |_| 1);
    if plan.is_empty() {
        println!("{}", "Nothing importable in this file.".yellow());
    }
}

fn print_settings(settings: &Settings) {
    println!("{}", "Settings:".bold());
    println!("  Model: {}", settings.model.to_string().cyan());
    println!(
        "  Language: {} ({})",
        settings.language,
        settings.language.display_name()
    );
    let marker = if settings.has_default_instruction() {
        " (default)".green().to_string()
    } else {
        String::new()
    };
    println!("  System instruction{}:", marker);
    println!("    {}", truncate_string(&single_line(&settings.system_instruction), 100).dimmed());
}

fn format_timestamp(entry: &HistoryEntry) -> String {
    entry
        .created_at()
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate string safely for UTF-8 (by char count, not bytes)
fn truncate_string(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        format!("{}...", chars.into_iter().collect::<String>())
    } else {
        s.to_string()
    }
}
