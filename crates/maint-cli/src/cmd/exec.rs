use crate::output::print_snapshots;
use anyhow::{bail, Context};
use maint_core::description::TYPE;
use maint_core::{ActionDescription, ActionFactory, ActionRegistry, ActionState, MaintenanceConfig};

/// Parse a `--set key=value` argument.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

pub fn run(
    config: MaintenanceConfig,
    action_type: &str,
    set: Vec<(String, String)>,
    properties: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    if set.iter().any(|(k, _)| k == TYPE) {
        bail!("use --type instead of --set {TYPE}=...");
    }
    let mut pairs = vec![(TYPE.to_string(), action_type.to_string())];
    pairs.extend(set);
    let description = ActionDescription::new(pairs);

    let properties = match properties {
        Some(raw) => serde_json::from_str(raw).context("--properties is not valid JSON")?,
        None => serde_json::json!({}),
    };

    let registry = ActionRegistry::new(config, ActionFactory::with_scripted());
    let action = registry
        .execute_now(description, properties)
        .with_context(|| format!("cannot execute '{action_type}' action"))?;

    print_snapshots(&registry.snapshots(), json)?;

    if action.state() == ActionState::Failed {
        let result = action.result();
        bail!(
            "action {} failed with code {}: {}",
            action.id(),
            result.code.0,
            result.message
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_splits_on_first_equals() {
        assert_eq!(
            parse_key_value("name=a=b").unwrap(),
            ("name".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_value("database=").unwrap(),
            ("database".to_string(), String::new())
        );
    }

    #[test]
    fn key_value_requires_key_and_equals() {
        assert!(parse_key_value("database").is_err());
        assert!(parse_key_value("=x").is_err());
    }
}
