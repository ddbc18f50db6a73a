//! Functions manifest parsing
//!
//! Parses `functions.yaml`, which maps each function to the HTTP events that
//! trigger it, with environment variable substitution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// The functions manifest (functions.yaml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionsManifest {
    /// Service name
    pub service: String,

    /// Function definitions keyed by function name
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionConfig>,
}

/// One function and the events that trigger it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionConfig {
    /// Registered handler name, defaults to the function's key
    #[serde(default)]
    pub handler: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub events: Vec<EventConfig>,
}

/// A trigger. Only `http` events are understood.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    #[serde(default)]
    pub http: Option<HttpEvent>,
}

/// HTTP trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpEvent {
    /// HTTP method (get, post, ...) or `any`
    pub method: String,

    /// URL path pattern (supports {param} syntax), with or without leading slash
    pub path: String,

    /// Add permissive CORS headers to responses
    #[serde(default)]
    pub cors: bool,
}

/// A flattened, normalized route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub function: String,
    pub handler: String,
    /// Upper-case method, or `ANY`
    pub method: String,
    /// Path pattern with a leading slash
    pub path: String,
    pub cors: bool,
}

impl Route {
    /// Match a request against this route, returning the extracted path
    /// parameters on success.
    pub fn matches(&self, method: &str, path: &str) -> Option<HashMap<String, String>> {
        if self.method != "ANY" && !self.method.eq_ignore_ascii_case(method) {
            return None;
        }
        match_path_pattern(&self.path, path)
    }

    /// Whether the pattern declares any `{param}` segments.
    pub fn has_parameters(&self) -> bool {
        self.path.split('/').any(is_param_segment)
    }

    fn param_count(&self) -> usize {
        self.path.split('/').filter(|s| is_param_segment(s)).count()
    }
}

fn is_param_segment(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// Match a `{param}` pattern against a concrete path
fn match_path_pattern(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.trim_end_matches('/').split('/').collect();
    let path_parts: Vec<&str> = path.trim_end_matches('/').split('/').collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if is_param_segment(pattern_part) {
            let param_name = &pattern_part[1..pattern_part.len() - 1];
            params.insert(param_name.to_string(), path_part.to_string());
        } else if pattern_part != path_part {
            // Static parts must match exactly
            return None;
        }
    }

    Some(params)
}

impl FunctionsManifest {
    /// Parse a manifest from YAML content
    pub fn parse(yaml: &str) -> Result<Self> {
        // First, substitute environment variables
        let expanded = expand_env_vars(yaml)?;

        // Then parse
        serde_yaml::from_str(&expanded).context("Failed to parse functions manifest")
    }

    /// Load a manifest from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read manifest file: {:?}", path.as_ref()))?;
        Self::parse(&content)
    }

    /// Validate the manifest. `is_known` reports whether a handler name is
    /// registered.
    pub fn validate(&self, is_known: impl Fn(&str) -> bool) -> Result<()> {
        if self.service.is_empty() {
            anyhow::bail!("Service name is required");
        }
        if self.functions.is_empty() {
            anyhow::bail!("At least one function is required");
        }

        for (name, function) in &self.functions {
            let handler = function.handler.as_deref().unwrap_or(name);
            if !is_known(handler) {
                anyhow::bail!("Function '{}' refers to unknown handler '{}'", name, handler);
            }

            let mut http_events = 0;
            for http in function.events.iter().filter_map(|e| e.http.as_ref()) {
                if http.method.is_empty() {
                    anyhow::bail!("Function '{}' has an http event without a method", name);
                }
                if http.path.is_empty() {
                    anyhow::bail!("Function '{}' has an http event without a path", name);
                }
                http_events += 1;
            }
            if http_events == 0 {
                anyhow::bail!("Function '{}' has no http events", name);
            }
        }

        Ok(())
    }

    /// Flatten every http event into a route. Routes without path
    /// parameters come first so `/ping/health` wins over `/ping/{id}`.
    pub fn routes(&self) -> Vec<Route> {
        let mut routes: Vec<Route> = self
            .functions
            .iter()
            .flat_map(|(name, function)| {
                let handler = function.handler.clone().unwrap_or_else(|| name.clone());
                function
                    .events
                    .iter()
                    .filter_map(|e| e.http.as_ref())
                    .map(move |http| Route {
                        function: name.clone(),
                        handler: handler.clone(),
                        method: http.method.to_ascii_uppercase(),
                        path: format!("/{}", http.path.trim_start_matches('/')),
                        cors: http.cors,
                    })
            })
            .collect();

        routes.sort_by_key(|route| route.param_count());
        routes
    }
}

/// Expand environment variables in a string
/// Supports: ${VAR}, ${VAR:-default}, $VAR
fn expand_env_vars(input: &str) -> Result<String> {
    // Pattern: ${VAR:-default} or ${VAR}
    let braced = regex_lite::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")?;
    let result = braced.replace_all(input, |caps: &regex_lite::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str());

        std::env::var(var_name).unwrap_or_else(|_| default.unwrap_or("").to_string())
    });

    // Pattern: $VAR (simple)
    let simple = regex_lite::Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)")?;
    let result = simple.replace_all(&result, |caps: &regex_lite::Captures| {
        std::env::var(&caps[1]).unwrap_or_default()
    });

    Ok(result.into_owned())
}
