use maint_core::{ActionSnapshot, ActionState};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

fn state_name(code: u8) -> String {
    ActionState::from_code(code)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| format!("unknown({code})"))
}

/// Print action snapshots as a table, or as a JSON array with `--json`.
pub fn print_snapshots(snapshots: &[ActionSnapshot], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&snapshots);
    }
    if snapshots.is_empty() {
        println!("No actions.");
        return Ok(());
    }
    let rows = snapshots
        .iter()
        .map(|s| {
            let description = s
                .description
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(",");
            vec![
                s.id.to_string(),
                state_name(s.state),
                s.progress.to_string(),
                s.result.to_string(),
                description,
                s.message.clone(),
            ]
        })
        .collect();
    print_table(
        &["ID", "STATE", "PROGRESS", "RESULT", "DESCRIPTION", "MESSAGE"],
        rows,
    );
    Ok(())
}
