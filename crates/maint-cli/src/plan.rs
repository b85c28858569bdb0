use anyhow::Context;
use maint_core::ActionDescription;
use serde::Deserialize;
use std::path::Path;

/// A batch of actions submitted together by `maintctl run`.
///
/// ```yaml
/// actions:
///   - description: { type: scripted, database: _system, collection: c1 }
///     properties: { steps: 3 }
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    #[serde(default)]
    pub actions: Vec<PlannedAction>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannedAction {
    pub description: ActionDescription,
    #[serde(default)]
    pub properties: serde_json::Value,
}

impl Plan {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read plan {}", path.display()))?;
        Self::from_yaml_str(&data).with_context(|| format!("invalid plan {}", path.display()))
    }

    pub fn from_yaml_str(data: &str) -> anyhow::Result<Self> {
        if data.trim().is_empty() {
            return Ok(Plan {
                actions: Vec::new(),
            });
        }
        Ok(serde_yaml::from_str(data)?)
    }
}
