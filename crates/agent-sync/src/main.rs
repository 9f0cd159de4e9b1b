use std::path::{Path, PathBuf};

use anyhow::Context as _;
use env_flags::env_flags;
use once_cell::sync::OnceCell;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, prelude::*};

use agent_sync::config::{
    Operation, RemoteEnv, UserConfig, agent_sync_home, expand_home, load_user_config,
    resolve_remote,
};
use agent_sync::loader::{choose_project, detect_projects, load_declared};
use agent_sync::maintain::{Maintenance, gpt5_candidates, run_maintenance};
use agent_sync::model::{DeclaredAgent, RemoteIndex};
use agent_sync::reconcile::{Mode, reconcile};
use agent_sync::remote::{AgentDirectory, HttpAgentDirectory};
use agent_sync::report::RunReport;
use agent_sync::selection::{Choice, parse_choice};

#[derive(Debug, Clone, Copy)]
enum LogStyle {
    Json,
    Compact,
    Pretty,
    Full,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer<W>(writer: W, ansi: bool, style: LogStyle) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let base = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);
    match style {
        LogStyle::Json => base.json().boxed(),
        LogStyle::Compact => base.compact().boxed(),
        LogStyle::Pretty => base.pretty().boxed(),
        LogStyle::Full => base.boxed(),
    }
}

/// Env value when the variable is set, else the config file value, else the
/// env-flags default.
fn layered<T>(key: &str, env_value: T, file: Option<T>) -> T {
    if std::env::var_os(key).is_some() {
        env_value
    } else {
        file.unwrap_or(env_value)
    }
}

fn init_tracing(home: &Path, user_cfg: Option<&UserConfig>) {
    env_flags! {
        /// Tracing filter, e.g. "info", "debug", or targets format.
        RUST_LOG: &str = "info";
        /// Preferred filter env (alias). If set, overrides RUST_LOG.
        TRACING_FILTER: &str = "";
        /// Pretty formatting for logs (ignored if TRACING_JSON=true).
        TRACING_PRETTY: bool = false;
        /// Compact single-line formatting for logs (ignored if TRACING_JSON=true)
        TRACING_COMPACT: bool = true;
        /// JSON formatting for logs
        TRACING_JSON: bool = false;
        /// If true, also log to file under <AGENT_SYNC_HOME>/logs or LOG_DIR
        LOG_TO_FILE: bool = false;
        /// Optional explicit log directory (absolute). Defaults to <AGENT_SYNC_HOME>/logs
        LOG_DIR: &str = "";
    }

    let logging = user_cfg.and_then(|c| c.logging.as_ref());

    // TRACING_FILTER beats RUST_LOG; either beats the config file level.
    let rust_log = if !(*TRACING_FILTER).is_empty() {
        (*TRACING_FILTER).to_string()
    } else {
        let file_level = logging.and_then(|l| l.level.as_deref());
        layered("RUST_LOG", *RUST_LOG, file_level).to_string()
    };
    let tracing_json = layered("TRACING_JSON", *TRACING_JSON, logging.and_then(|l| l.json));
    let tracing_compact = layered(
        "TRACING_COMPACT",
        *TRACING_COMPACT,
        logging.and_then(|l| l.compact),
    );
    let tracing_pretty =
        layered("TRACING_PRETTY", *TRACING_PRETTY, logging.and_then(|l| l.pretty));
    let log_to_file = layered("LOG_TO_FILE", *LOG_TO_FILE, logging.and_then(|l| l.to_file));
    let log_dir = layered("LOG_DIR", *LOG_DIR, logging.and_then(|l| l.dir.as_deref()));

    let filter = EnvFilter::try_new(rust_log).unwrap_or_else(|_| EnvFilter::new("info"));
    let style = if tracing_json {
        LogStyle::Json
    } else if tracing_compact {
        LogStyle::Compact
    } else if tracing_pretty {
        LogStyle::Pretty
    } else {
        LogStyle::Full
    };

    // Always write logs to stderr; stdout carries the run report.
    let mut layers = vec![fmt_layer(std::io::stderr, true, style)];

    static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();
    let mut dir_error = None;
    if log_to_file {
        let dir = if log_dir.is_empty() {
            home.join("logs")
        } else {
            expand_home(log_dir)
        };
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(&dir, "agent-sync.log");
                let (nb, guard) = tracing_appender::non_blocking(appender);
                let _ = FILE_GUARD.set(guard);
                layers.push(fmt_layer(nb, false, style));
            }
            Err(e) => dir_error = Some((dir, e)),
        }
    }

    if let Err(e) = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
    {
        tracing::debug!("tracing already set: {:?}", e);
    }
    if let Some((dir, e)) = dir_error {
        tracing::warn!("failed to create log dir {}: {}", dir.display(), e);
    }
}

fn resolve_agents_dir(workspace: &str, agents_dir: &str, project: &str) -> anyhow::Result<PathBuf> {
    if !agents_dir.is_empty() {
        return Ok(expand_home(agents_dir));
    }
    let workspace = if workspace.is_empty() {
        std::env::current_dir().context("cannot determine current directory")?
    } else {
        expand_home(workspace)
    };
    let projects = detect_projects(&workspace)?;
    for p in &projects {
        tracing::info!("found project {} ({} agent file(s))", p.name, p.file_count);
    }
    let wanted = Some(project).filter(|p| !p.is_empty());
    Ok(choose_project(&projects, wanted)?.agents_dir.clone())
}

async fn run_reconcile(
    directory: &dyn AgentDirectory,
    agents_dir: &Path,
    select: &str,
    mode: Mode,
) -> anyhow::Result<Option<RunReport>> {
    let loaded = load_declared(agents_dir)?;
    tracing::info!(
        "loaded {} agent(s) from {}",
        loaded.agents.len(),
        agents_dir.display()
    );
    let chosen: Vec<DeclaredAgent> = match parse_choice(select, loaded.agents.len())? {
        Choice::Quit => return Ok(None),
        Choice::All => loaded.agents,
        Choice::Indices(set) => set.pick(&loaded.agents).into_iter().cloned().collect(),
    };

    let summaries = directory
        .list_agents()
        .await
        .context("failed to list remote agents")?;
    let index = RemoteIndex::from_summaries(&summaries);
    tracing::info!(
        "{} remote agent(s); reconciling {} declared in {:?} mode",
        index.len(),
        chosen.len(),
        mode
    );

    let items = reconcile(directory, &chosen, &index, mode).await;
    Ok(Some(RunReport::Reconcile {
        mode,
        load_errors: loaded.errors,
        items,
    }))
}

async fn run_maintain(
    directory: &dyn AgentDirectory,
    select: &str,
    task: Maintenance,
    gpt5_only: bool,
) -> anyhow::Result<Option<RunReport>> {
    let agents = directory
        .list_agents()
        .await
        .context("failed to list remote agents")?;
    let index = RemoteIndex::from_summaries(&agents);
    if index.is_empty() {
        tracing::warn!("remote directory has no agents");
    }
    let offered = if task == Maintenance::StripSampling && gpt5_only {
        gpt5_candidates(directory, &agents).await
    } else {
        agents
    };
    for (i, agent) in offered.iter().enumerate() {
        tracing::info!("{:>3}. {}", i + 1, agent.name);
    }

    let names: Vec<String> = match parse_choice(select, offered.len())? {
        Choice::Quit => return Ok(None),
        Choice::All => offered.iter().map(|a| a.name.clone()).collect(),
        Choice::Indices(set) => set
            .pick(&offered)
            .into_iter()
            .map(|a| a.name.clone())
            .collect(),
    };

    let items = run_maintenance(directory, &names, &index, task).await;
    Ok(Some(RunReport::Maintain { task, items }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_flags! {
        /// Home for config.toml and logs (absolute). Defaults to $HOME/.agent-sync
        AGENT_SYNC_HOME: &str = "";
        /// create | update | sync | approve-mcp | strip-sampling (or 1..5)
        MODE: &str = "sync";
        /// Workspace scanned for <project>/agents/. Defaults to the current execution directory.
        WORKSPACE_DIR: &str = "";
        /// Explicit agents directory; skips project detection when set.
        AGENTS_DIR: &str = "";
        /// Project to use when the workspace has several.
        PROJECT: &str = "";
        /// Items to act on: "a" (all), "q" (quit) or ranges such as "1-3,5".
        SELECT: &str = "a";
        /// Offer only GPT-5-class agents for strip-sampling.
        GPT5_ONLY: bool = true;
        /// Print the run report as JSON on stdout.
        OUTPUT_JSON: bool = false;
    }

    let home = agent_sync_home(*AGENT_SYNC_HOME);
    let (user_cfg, cfg_error) = match load_user_config(&home) {
        Ok(cfg) => (cfg, None),
        Err(e) => (None, Some(e)),
    };
    init_tracing(&home, user_cfg.as_ref());
    if let Some(e) = cfg_error {
        tracing::warn!("ignoring user config: {:#}", e);
    }

    let agents_cfg = user_cfg.as_ref().and_then(|c| c.agents.as_ref());
    let mode = layered("MODE", *MODE, agents_cfg.and_then(|c| c.mode.as_deref()));
    let workspace_dir = layered(
        "WORKSPACE_DIR",
        *WORKSPACE_DIR,
        agents_cfg.and_then(|c| c.workspace_dir.as_deref()),
    );
    let agents_dir = layered(
        "AGENTS_DIR",
        *AGENTS_DIR,
        agents_cfg.and_then(|c| c.agents_dir.as_deref()),
    );
    let project = layered(
        "PROJECT",
        *PROJECT,
        agents_cfg.and_then(|c| c.project.as_deref()),
    );
    let gpt5_only = layered("GPT5_ONLY", *GPT5_ONLY, agents_cfg.and_then(|c| c.gpt5_only));
    let output_json = layered(
        "OUTPUT_JSON",
        *OUTPUT_JSON,
        agents_cfg.and_then(|c| c.output_json),
    );

    let operation: Operation = mode.parse()?;
    let remote = resolve_remote(
        RemoteEnv::from_env(),
        user_cfg.as_ref().and_then(|c| c.remote.as_ref()),
    )?;
    tracing::info!(
        "starting agent-sync (mode={}, endpoint={}, api-version={})",
        mode,
        remote.endpoint,
        remote.api_version
    );
    let directory = HttpAgentDirectory::new(remote)?;

    let report = match operation {
        Operation::Reconcile(mode) => {
            let dir = resolve_agents_dir(workspace_dir, agents_dir, project)?;
            run_reconcile(&directory, &dir, *SELECT, mode).await?
        }
        Operation::Maintain(task) => run_maintain(&directory, *SELECT, task, gpt5_only).await?,
    };
    let Some(report) = report else {
        tracing::info!("nothing selected; exiting");
        return Ok(());
    };

    if output_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    if report.has_failures() {
        anyhow::bail!("one or more agents could not be published");
    }
    Ok(())
}
