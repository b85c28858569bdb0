use crate::output::print_json;
use maint_core::config::WarnLevel;
use maint_core::MaintenanceConfig;

pub fn run(config: &MaintenanceConfig, json: bool) -> anyhow::Result<()> {
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({
            "config": config,
            "warnings": warnings,
        }))?;
        return Ok(());
    }

    print!("{}", serde_yaml::to_string(config)?);
    for w in &warnings {
        let prefix = match w.level {
            WarnLevel::Error => "error",
            WarnLevel::Warning => "warning",
        };
        println!("{prefix}: {}", w.message);
    }
    Ok(())
}
