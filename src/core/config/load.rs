//! Configuration loading with env-var overrides.
//!
//! Reads YAML files, supports top-level `base: "..."` inheritance chains,
//! resolves directories against the project root, and reads credentials and
//! endpoint overrides from an [`EnvSnapshot`].

use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

use super::raw::{self, RawProjectConfig, RawRag, RawToolsConfig};
use super::types::*;

/// Default tools config location, relative to the working directory.
pub const DEFAULT_TOOLS_CONFIG: &str = "configs/tools_config.yml";
/// Default project config location, relative to the working directory.
pub const DEFAULT_PROJECT_CONFIG: &str = "configs/project_config.yml";

const RAG_KEYS: [(&str, Kind); 9] = [
    ("llm", Kind::Text),
    ("llm_temperature", Kind::Number),
    ("embedding_model", Kind::Text),
    ("vectordb", Kind::Text),
    ("unstructured_docs", Kind::Text),
    ("k", Kind::Count),
    ("chunk_size", Kind::Count),
    ("chunk_overlap", Kind::Count),
    ("collection_name", Kind::Text),
];

const PROJECT_KEYS: [(&str, Kind); 4] = [
    ("directories.memory_dir", Kind::Text),
    ("logging.level", Kind::Text),
    ("llm.api_base_url", Kind::Text),
    ("llm.timeout_seconds", Kind::Count),
];

/// Expected shape of a scalar config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Number,
    /// Non-negative integer that fits in a `u32`.
    Count,
    /// String or number; used for ids.
    Id,
}

impl Kind {
    fn accepts(self, value: &serde_yaml::Value) -> bool {
        match self {
            Kind::Text => value.is_string(),
            Kind::Number => value.as_f64().is_some(),
            Kind::Count => value.as_u64().is_some_and(|n| n <= u64::from(u32::MAX)),
            Kind::Id => value.is_string() || value.is_number(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Kind::Text => "a string",
            Kind::Number => "a number",
            Kind::Count => "a non-negative integer",
            Kind::Id => "a string or number",
        }
    }
}

/// Immutable copy of the environment variables the loader cares about.
///
/// Captured once at startup. Tests build one from literal pairs instead of
/// mutating the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn from_process() -> Self {
        Self { vars: env::vars().collect() }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Non-empty value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str).filter(|v| !v.trim().is_empty())
    }
}

/// Deep-merge two YAML values.
/// Mappings are merged recursively — the overlay only needs to specify keys
/// that differ from the base. Every other value is replaced wholesale.
fn merge_yaml(base: serde_yaml::Value, overlay: serde_yaml::Value) -> serde_yaml::Value {
    use serde_yaml::Value;
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, ov_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => merge_yaml(base_val, ov_val),
                    None => ov_val,
                };
                base_map.insert(key, merged);
            }
            Value::Mapping(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `base: "..."` chain, and return the fully
/// merged value. `visited` carries canonicalized paths already seen in this
/// chain so circular references are caught early.
fn load_raw_merged(
    path: &Path,
    visited: &mut HashSet<PathBuf>,
) -> Result<serde_yaml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let text = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay: serde_yaml::Value = serde_yaml::from_str(&text)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    // An empty document parses as null; treat it as an empty mapping.
    let overlay = if overlay.is_null() {
        serde_yaml::Value::Mapping(Default::default())
    } else {
        overlay
    };

    if let Some(base_str) = overlay.get("base").and_then(|b| b.as_str()) {
        let base_path = if Path::new(base_str).is_absolute() {
            PathBuf::from(base_str)
        } else {
            path.parent().unwrap_or(Path::new(".")).join(base_str)
        };
        let base_val = load_raw_merged(&base_path, visited)?;
        Ok(merge_yaml(base_val, overlay))
    } else {
        Ok(overlay)
    }
}

/// Every key path the tools config must declare, in file order.
fn required_tools_keys() -> Vec<(String, Kind)> {
    let mut keys = vec![
        ("primary_agent.llm".to_string(), Kind::Text),
        ("primary_agent.llm_temperature".to_string(), Kind::Number),
        ("tavily_search_api.tavily_search_max_results".to_string(), Kind::Count),
    ];
    for section in ["swiss_airline_policy_rag", "stories_rag"] {
        keys.extend(RAG_KEYS.iter().map(|(k, kind)| (format!("{section}.{k}"), *kind)));
    }
    keys.push(("graph_configs.thread_id".to_string(), Kind::Id));
    keys
}

fn lookup<'a>(value: &'a serde_yaml::Value, dotted: &str) -> Option<&'a serde_yaml::Value> {
    dotted
        .split('.')
        .try_fold(value, |node, segment| node.get(segment))
        .filter(|v| !v.is_null())
}

fn check_kind(value: &serde_yaml::Value, key: &str, kind: Kind, path: &Path) -> Result<(), AppError> {
    if kind.accepts(value) {
        return Ok(());
    }
    let found = serde_yaml::to_string(value).unwrap_or_default();
    Err(AppError::Config(format!(
        "key `{key}` in {} must be {}, found `{}`",
        path.display(),
        kind.describe(),
        found.trim()
    )))
}

/// Fail with the first missing or mistyped key path rather than a bare
/// serde message.
fn check_required(value: &serde_yaml::Value, path: &Path) -> Result<(), AppError> {
    for (key, kind) in required_tools_keys() {
        let Some(found) = lookup(value, &key) else {
            return Err(AppError::Config(format!(
                "missing key `{key}` in {}",
                path.display()
            )));
        };
        check_kind(found, &key, kind, path)?;
    }
    Ok(())
}

/// Project keys are optional, but a present key must have the right shape.
fn check_optional(value: &serde_yaml::Value, path: &Path) -> Result<(), AppError> {
    for (key, kind) in PROJECT_KEYS {
        if let Some(found) = lookup(value, key) {
            check_kind(found, key, kind, path)?;
        }
    }
    Ok(())
}

/// Load settings from the default locations (or the given overrides) using
/// the process environment and the current working directory as project root.
///
/// An explicitly passed project config must exist; the default one is
/// optional.
pub fn load(tools_path: Option<&Path>, project_path: Option<&Path>) -> Result<Settings, AppError> {
    let root = env::current_dir()
        .map_err(|e| AppError::Config(format!("cannot resolve working directory: {e}")))?;

    let tools_path = tools_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(DEFAULT_TOOLS_CONFIG));

    let project_path = match project_path {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let p = root.join(DEFAULT_PROJECT_CONFIG);
            p.exists().then_some(p)
        }
    };

    load_from(&tools_path, project_path.as_deref(), &root, &EnvSnapshot::from_process())
}

/// Internal loader — accepts explicit paths, project root, and environment.
/// Follows `base` inheritance chains in both files before resolving.
pub fn load_from(
    tools_path: &Path,
    project_path: Option<&Path>,
    root: &Path,
    env: &EnvSnapshot,
) -> Result<Settings, AppError> {
    let tools_val = load_raw_merged(tools_path, &mut HashSet::new())?;
    check_required(&tools_val, tools_path)?;
    let tools: RawToolsConfig = serde_yaml::from_value(tools_val)
        .map_err(|e| AppError::Config(format!("invalid {}: {e}", tools_path.display())))?;

    let project: RawProjectConfig = match project_path {
        Some(p) => {
            let project_val = load_raw_merged(p, &mut HashSet::new())?;
            check_optional(&project_val, p)?;
            serde_yaml::from_value(project_val)
                .map_err(|e| AppError::Config(format!("invalid {}: {e}", p.display())))?
        }
        None => RawProjectConfig::default(),
    };

    let credentials = read_credentials(env)?;
    let chroma = read_chroma(env)?;

    let thread_id = tools.graph_configs.thread_id.trim().to_string();
    validate_thread_id(&thread_id)?;

    let log_level = env
        .get("AGENTGRAPH_LOG_LEVEL")
        .map(str::to_string)
        .unwrap_or(project.logging.level);

    Ok(Settings {
        primary_agent: PrimaryAgentConfig {
            llm: tools.primary_agent.llm,
            llm_temperature: tools.primary_agent.llm_temperature,
        },
        tavily_search: TavilySearchConfig {
            max_results: tools.tavily_search_api.tavily_search_max_results,
        },
        policy_rag: resolve_rag(tools.swiss_airline_policy_rag, root),
        stories_rag: resolve_rag(tools.stories_rag, root),
        graph: GraphConfig { thread_id },
        project: ProjectConfig {
            memory_dir: resolve_dir(&project.directories.memory_dir, root),
            log_level,
            llm_api_base_url: project.llm.api_base_url,
            llm_timeout_seconds: project.llm.timeout_seconds.max(1),
        },
        chroma,
        credentials,
    })
}

fn resolve_rag(raw: RawRag, root: &Path) -> RagConfig {
    RagConfig {
        llm: raw.llm,
        llm_temperature: raw.llm_temperature,
        embedding_model: raw.embedding_model,
        vectordb_dir: resolve_dir(&raw.vectordb, root),
        unstructured_docs_dir: resolve_dir(&raw.unstructured_docs, root),
        k: raw.k,
        chunk_size: raw.chunk_size,
        chunk_overlap: raw.chunk_overlap,
        collection_name: raw.collection_name,
    }
}

fn read_credentials(env: &EnvSnapshot) -> Result<Credentials, AppError> {
    let require = |key: &str| {
        env.get(key)
            .map(str::to_string)
            .ok_or_else(|| AppError::Config(format!("required environment variable {key} is not set")))
    };
    Ok(Credentials {
        openai_api_key: require("OPENAI_API_KEY")?,
        tavily_api_key: require("TAVILY_API_KEY")?,
    })
}

fn read_chroma(env: &EnvSnapshot) -> Result<ChromaConfig, AppError> {
    let host = env
        .get("CHROMA_HOST")
        .unwrap_or(raw::DEFAULT_CHROMA_HOST)
        .to_string();
    let port = match env.get("CHROMA_PORT") {
        Some(p) => p
            .trim()
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("CHROMA_PORT '{p}' is not a valid port: {e}")))?,
        None => raw::DEFAULT_CHROMA_PORT,
    };
    Ok(ChromaConfig { host, port })
}

/// The thread id doubles as a file stem under the memory directory.
fn validate_thread_id(thread_id: &str) -> Result<(), AppError> {
    let bad = thread_id.is_empty()
        || thread_id == "."
        || thread_id == ".."
        || thread_id.contains(['/', '\\', '\0']);
    if bad {
        return Err(AppError::Config(format!(
            "graph_configs.thread_id '{thread_id}' cannot be used as a file name"
        )));
    }
    Ok(())
}

/// Expand `~`, then anchor relative paths at `root`.
fn resolve_dir(path: &str, root: &Path) -> PathBuf {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
