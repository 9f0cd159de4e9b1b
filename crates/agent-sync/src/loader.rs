//! Desired-state loading.
//!
//! Responsibilities:
//! - Discover agent project folders (`<workspace>/<project>/agents/`).
//! - Collect `*.yaml`/`*.yml` agent files in a stable order.
//! - Parse each file into a `DeclaredAgent`, recording files that fail to parse
//!   instead of aborting the whole load.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Serialize;

use crate::model::DeclaredAgent;
use crate::parser::AgentParser;
use crate::parser::agent_yaml::AgentYamlParser;

/// Folder name holding agent files inside a project.
pub const AGENTS_SUBDIR: &str = "agents";

/// A workspace subdirectory that carries an `agents/` folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentProject {
    pub name: String,
    pub agents_dir: PathBuf,
    pub file_count: usize,
}

/// A file that could not be read or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadError {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct LoadedAgents {
    pub agents: Vec<DeclaredAgent>,
    pub errors: Vec<LoadError>,
}

/// Agent files directly under `dir`, sorted by path.
///
/// Errors when the directory is missing or holds no agent files; a run with
/// nothing to reconcile is almost always a wrong path.
pub fn load_agent_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("agents directory not found: {}", dir.display());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read_dir {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && AgentYamlParser::supports(&path) {
            files.push(path);
        }
    }
    if files.is_empty() {
        anyhow::bail!("no agent YAML files in {}", dir.display());
    }
    files.sort();
    Ok(files)
}

/// Parse every agent file in `dir`.
pub fn load_declared(dir: &Path) -> anyhow::Result<LoadedAgents> {
    let mut loaded = LoadedAgents::default();
    for path in load_agent_files(dir)? {
        let parsed = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))
            .and_then(|content| AgentYamlParser::parse(&content, &path));
        match parsed {
            Ok(agent) => loaded.agents.push(agent),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
                loaded.errors.push(LoadError {
                    path,
                    message: format!("{e:#}"),
                });
            }
        }
    }
    tracing::debug!(
        "loaded {} agent(s) from {} ({} unreadable)",
        loaded.agents.len(),
        dir.display(),
        loaded.errors.len()
    );
    Ok(loaded)
}

/// Immediate subdirectories of `workspace` that contain an `agents/` folder,
/// sorted by name.
pub fn detect_projects(workspace: &Path) -> anyhow::Result<Vec<AgentProject>> {
    let mut out = Vec::new();
    for entry in
        fs::read_dir(workspace).with_context(|| format!("read_dir {}", workspace.display()))?
    {
        let path = entry?.path();
        let agents_dir = path.join(AGENTS_SUBDIR);
        if !agents_dir.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        let file_count = load_agent_files(&agents_dir).map(|f| f.len()).unwrap_or(0);
        out.push(AgentProject {
            name: name.to_string(),
            agents_dir,
            file_count,
        });
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

/// Pick the project to load: the one named `wanted`, or the only candidate.
pub fn choose_project<'a>(
    projects: &'a [AgentProject],
    wanted: Option<&str>,
) -> anyhow::Result<&'a AgentProject> {
    match (wanted, projects) {
        (Some(name), _) => projects
            .iter()
            .find(|p| p.name == name)
            .with_context(|| format!("project '{name}' has no {AGENTS_SUBDIR}/ folder")),
        (None, [only]) => Ok(only),
        (None, []) => anyhow::bail!("no project with an {AGENTS_SUBDIR}/ folder found"),
        (None, many) => {
            let names: Vec<&str> = many.iter().map(|p| p.name.as_str()).collect();
            anyhow::bail!(
                "several projects found ({}); set PROJECT to choose one",
                names.join(", ")
            )
        }
    }
}
