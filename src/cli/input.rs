//! Input resolution
//!
//! Works out where the workflow comes from and turns `--secret`/`--env`
//! arguments into flat string maps.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::common::{Error, Result, StringMap};

/// Where the workflow body comes from
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowSource {
    /// A workflow file, read by the engine
    File(PathBuf),
    /// Workflow text from the command line or stdin
    Inline(String),
}

/// Which resolution step produced an option map
#[derive(Debug, Clone, PartialEq)]
pub enum MapOrigin {
    /// The argument itself was a JSON object
    Literal,
    /// The argument named a JSON file
    File(PathBuf),
}

/// A successfully resolved `--secret`/`--env` argument
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMap {
    pub origin: MapOrigin,
    pub map: StringMap,
}

/// Resolve the workflow source
///
/// A non-blank `--path` wins, then a non-blank positional argument, then
/// stdin read to the end. Blank stdin means there is no input at all.
pub async fn resolve_source<R>(
    path: Option<&Path>,
    inline: Option<&str>,
    mut stdin: R,
) -> Result<WorkflowSource>
where
    R: AsyncRead + Unpin,
{
    if let Some(path) = path.filter(|p| !is_blank(&p.to_string_lossy())) {
        tracing::debug!("Reading workflow from file {}", path.display());
        return Ok(WorkflowSource::File(path.to_path_buf()));
    }

    if let Some(text) = inline.filter(|t| !is_blank(t)) {
        tracing::debug!("Reading workflow from argument ({} bytes)", text.len());
        return Ok(WorkflowSource::Inline(text.to_string()));
    }

    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .await
        .map_err(Error::StdinRead)?;

    if is_blank(&text) {
        return Err(Error::InputMissing);
    }
    tracing::debug!("Reading workflow from stdin ({} bytes)", text.len());
    Ok(WorkflowSource::Inline(text))
}

/// Resolve a single `--secret`/`--env` argument
///
/// The argument is parsed as a JSON object first. If that fails it is taken
/// as a path to a file holding a JSON object.
pub fn resolve_option_map(flag: &'static str, raw: &str) -> Result<ResolvedMap> {
    let literal_error = match parse_map(raw) {
        Ok(map) => {
            return Ok(ResolvedMap {
                origin: MapOrigin::Literal,
                map,
            })
        }
        Err(e) => e,
    };

    let path = PathBuf::from(raw);
    let file_error = match std::fs::read_to_string(&path) {
        Ok(content) => match parse_map(&content) {
            Ok(map) => {
                return Ok(ResolvedMap {
                    origin: MapOrigin::File(path),
                    map,
                })
            }
            Err(e) => e,
        },
        Err(e) => e.to_string(),
    };

    Err(Error::invalid_option_map(flag, raw, &literal_error, &file_error))
}

/// Resolve and merge repeated arguments; later keys win
pub fn merge_option_maps(flag: &'static str, raws: &[String]) -> Result<StringMap> {
    let mut merged = StringMap::new();
    for raw in raws {
        let resolved = resolve_option_map(flag, raw)?;
        if let MapOrigin::File(path) = &resolved.origin {
            tracing::debug!("Loaded --{} values from {}", flag, path.display());
        }
        merged.extend(resolved.map);
    }
    Ok(merged)
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn parse_map(text: &str) -> std::result::Result<StringMap, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let Value::Object(object) = value else {
        return Err("expected a JSON object".to_string());
    };

    Ok(object
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}
