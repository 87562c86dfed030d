mod server;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rem_core::{
    EmbeddingProvider, ExperientialRecord, Forge, ForgeConfig, HashingProvider, Language, Tier,
    export_json,
};
use rem_store::{RecordStore, RemConfig, resolve_config};
use rmcp::{ServiceExt, transport::stdio};
use serde_json::Value;
use tokio::sync::Semaphore;

#[derive(Parser)]
#[command(name = "rem", about = "REMForge experiential record CLI and MCP server")]
struct Cli {
    /// Config file (default: $REM_DATA_DIR/remforge.toml, then ~/.remforge/remforge.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forge experiential records from text
    Forge(ForgeArgs),

    /// Print an archived record
    Show {
        /// Record id (TXT-...)
        rem_id: String,
    },

    /// List archived records, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show archive statistics
    Stats,

    /// Write an archived record to a JSON file
    Export {
        rem_id: String,
        path: PathBuf,
    },

    /// Delete an archived record
    Delete {
        rem_id: String,
    },

    /// Start MCP server on stdio transport
    Serve {
        #[arg(long, value_enum, default_value_t = ProviderArg::None)]
        provider: ProviderArg,
    },
}

#[derive(Args)]
struct ForgeArgs {
    /// Text to forge. Read from stdin when neither TEXT nor --file is given.
    text: Option<String>,

    /// Forge the contents of a file (repeatable)
    #[arg(long = "file", short = 'f')]
    files: Vec<PathBuf>,

    /// Context object as JSON, e.g. '{"situational_context":"morning walk"}'
    #[arg(long)]
    context: Option<String>,

    #[arg(long, value_enum)]
    tier: Option<TierArg>,

    /// Lexicon language (en, es)
    #[arg(long, value_parser = parse_language)]
    language: Option<Language>,

    #[arg(long, value_enum, default_value_t = ProviderArg::None)]
    provider: ProviderArg,

    /// Maximum inputs forged concurrently
    #[arg(long, default_value_t = 4)]
    jobs: usize,

    /// Per-input time limit; a timed-out input is reported and discarded
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,

    /// Archive the forged records
    #[arg(long)]
    save: bool,

    /// Write each record to <DIR>/<rem_id>.json instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Full,
    Lite,
}

impl From<TierArg> for Tier {
    fn from(t: TierArg) -> Self {
        match t {
            TierArg::Full => Tier::Full,
            TierArg::Lite => Tier::Lite,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProviderArg {
    /// Lexicon anchors only
    None,
    /// In-process trigram hashing embeddings
    Hashing,
}

fn parse_language(s: &str) -> std::result::Result<Language, String> {
    Language::parse(s).ok_or_else(|| format!("unsupported language '{s}' (expected en or es)"))
}

fn load_config(cli: &Cli) -> Result<RemConfig> {
    resolve_config(cli.config.as_deref()).context("failed to load config")
}

fn open_store(config: &RemConfig) -> Result<RecordStore> {
    config.open_store().context("failed to open record store")
}

fn build_forge(config: ForgeConfig, provider: ProviderArg) -> Result<Forge> {
    let forge = match provider {
        ProviderArg::None => Forge::new(config),
        ProviderArg::Hashing => Forge::with_provider_init(config, || {
            let provider = HashingProvider::new(HashingProvider::DEFAULT_DIM)?;
            Ok(Arc::new(provider) as Arc<dyn EmbeddingProvider>)
        }),
    };
    forge.context("invalid forge configuration")
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Forge(args) => cmd_forge(&cli, args).await,
        Commands::Show { rem_id } => cmd_show(&cli, rem_id),
        Commands::List { limit } => cmd_list(&cli, *limit),
        Commands::Stats => cmd_stats(&cli),
        Commands::Export { rem_id, path } => cmd_export(&cli, rem_id, path),
        Commands::Delete { rem_id } => cmd_delete(&cli, rem_id),
        Commands::Serve { provider } => cmd_serve(&cli, *provider).await,
    }
}

// ---------------------------------------------------------------------------
// Batch forging
// ---------------------------------------------------------------------------

struct Input {
    label: String,
    text: String,
}

fn collect_inputs(args: &ForgeArgs) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();
    if let Some(text) = &args.text {
        inputs.push(Input {
            label: "argument".to_string(),
            text: text.clone(),
        });
    }
    for path in &args.files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        inputs.push(Input {
            label: path.display().to_string(),
            text,
        });
    }
    if inputs.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        inputs.push(Input {
            label: "stdin".to_string(),
            text,
        });
    }
    Ok(inputs)
}

/// Forge every input on a pool of at most `jobs` blocking workers.
///
/// Results come back in input order. A timed-out input keeps its worker slot
/// until the pipeline call returns, but its result is dropped.
async fn forge_batch(
    forge: Arc<Forge>,
    inputs: Vec<Input>,
    context: Arc<Value>,
    jobs: usize,
    timeout: Option<Duration>,
) -> Vec<(String, std::result::Result<ExperientialRecord, String>)> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut handles = Vec::with_capacity(inputs.len());

    for Input { label, text } in inputs {
        let forge = Arc::clone(&forge);
        let context = Arc::clone(&context);
        let semaphore = Arc::clone(&semaphore);
        let handle = tokio::spawn(async move {
            let permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| format!("worker pool closed: {e}"))?;
            let work = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                forge.forge_value(&text, &context)
            });
            let joined = match timeout {
                Some(limit) => tokio::time::timeout(limit, work)
                    .await
                    .map_err(|_| format!("timed out after {}ms", limit.as_millis()))?,
                None => work.await,
            };
            let result: std::result::Result<ExperientialRecord, String> = match joined {
                Ok(Ok(record)) => Ok(record),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => Err(format!("worker failed: {e}")),
            };
            result
        });
        handles.push((label, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (label, handle) in handles {
        let result = match handle.await {
            Ok(r) => r,
            Err(e) => Err(format!("task failed: {e}")),
        };
        results.push((label, result));
    }
    results
}

fn render_record(record: &ExperientialRecord, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(record)
    } else {
        export_json(record)
    };
    json.context("failed to serialize record")
}

async fn cmd_forge(cli: &Cli, args: &ForgeArgs) -> Result<()> {
    let config = load_config(cli)?;
    let mut forge_config = config.forge.clone();
    if let Some(tier) = args.tier {
        forge_config.tier = tier.into();
    }
    if let Some(language) = args.language {
        forge_config.language = language;
    }
    let forge = Arc::new(build_forge(forge_config, args.provider)?);
    tracing::debug!(strategy = forge.anchor_strategy(), "forge ready");

    let context: Value = match &args.context {
        Some(raw) => serde_json::from_str(raw).context("--context is not valid JSON")?,
        None => Value::Null,
    };

    let inputs = collect_inputs(args)?;
    let total = inputs.len();
    let timeout = args.timeout_ms.map(Duration::from_millis);
    let results = forge_batch(forge, inputs, Arc::new(context), args.jobs, timeout).await;

    let mut records = Vec::with_capacity(total);
    let mut failed = 0usize;
    for (label, result) in results {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                failed += 1;
                tracing::error!(input = %label, "forge failed: {e}");
                eprintln!("error: {label}: {e}");
            }
        }
    }

    if let Some(dir) = &args.out {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        for record in &records {
            let path = dir.join(format!("{}.json", record.rem_id()));
            std::fs::write(&path, render_record(record, args.compact)?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {}", path.display());
        }
    } else {
        for record in &records {
            println!("{}", render_record(record, args.compact)?);
        }
    }

    if args.save && !records.is_empty() {
        let store = open_store(&config)?;
        store
            .save_records(&records)
            .context("failed to archive records")?;
        eprintln!("saved {} record(s)", records.len());
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {total} input(s) failed");
    }
    Ok(())
}

fn cmd_show(cli: &Cli, rem_id: &str) -> Result<()> {
    let store = open_store(&load_config(cli)?)?;
    let record = store
        .get_record(rem_id)
        .context("failed to load record")?
        .with_context(|| format!("record not found: {rem_id}"))?;
    println!("{}", render_record(&record, false)?);
    Ok(())
}

fn cmd_list(cli: &Cli, limit: usize) -> Result<()> {
    let store = open_store(&load_config(cli)?)?;
    let summaries = store.list_records(limit).context("failed to list records")?;

    if summaries.is_empty() {
        println!("(no records)");
        return Ok(());
    }
    for s in &summaries {
        println!(
            "{}  {}  {:<11} {:<10} {}",
            s.rem_id, s.created_at, s.intentional_mode, s.qualia_type, s.narrative
        );
    }
    Ok(())
}

fn cmd_stats(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let store = open_store(&config)?;
    let stats = store.stats().context("failed to compute stats")?;

    println!("records:    {}", stats.total);
    for (mode, count) in &stats.by_mode {
        println!("  {mode:<12}{count}");
    }
    println!("schema:     {}", rem_core::SCHEMA_VERSION);
    println!("db_path:    {}", config.db_path().display());
    Ok(())
}

fn cmd_export(cli: &Cli, rem_id: &str, path: &Path) -> Result<()> {
    let store = open_store(&load_config(cli)?)?;
    let record = store
        .get_record(rem_id)
        .context("failed to load record")?
        .with_context(|| format!("record not found: {rem_id}"))?;

    let json = render_record(&record, false)?;
    std::fs::write(path, &json).with_context(|| format!("failed to write {}", path.display()))?;

    println!("exported {rem_id} to {}", path.display());
    Ok(())
}

fn cmd_delete(cli: &Cli, rem_id: &str) -> Result<()> {
    let store = open_store(&load_config(cli)?)?;
    if !store.delete_record(rem_id).context("failed to delete record")? {
        anyhow::bail!("record not found: {rem_id}");
    }
    println!("deleted {rem_id}");
    Ok(())
}

// ---------------------------------------------------------------------------
// MCP server
// ---------------------------------------------------------------------------

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

async fn cmd_serve(cli: &Cli, provider: ProviderArg) -> Result<()> {
    let config = load_config(cli)?;
    let store = open_store(&config)?;
    let forge = build_forge(config.forge.clone(), provider)?;
    tracing::info!(
        strategy = forge.anchor_strategy(),
        "starting MCP server, archive at {}",
        config.db_path().display()
    );

    let server = server::RemServer::new(forge, store);
    let service = match server.clone().serve(stdio()).await {
        Ok(service) => service,
        Err(e) => {
            // stdin closed before the initialize handshake
            tracing::info!("MCP session ended before initialization: {e}");
            server.checkpoint_wal().await;
            return Ok(());
        }
    };

    tokio::select! {
        quit = service.waiting() => {
            quit.context("MCP server task failed")?;
        }
        () = shutdown_signal() => {}
    }

    server.checkpoint_wal().await;
    Ok(())
}
