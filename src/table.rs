use crate::db::Statistics;
use crate::models::Application;

/// Render applications as a fixed-width text table. Pure formatting; column
/// order is ID, COMPANY, POSITION, STATUS, APPLIED, NOTES.
pub fn render_table(records: &[Application]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<6} {:<22} {:<26} {:<14} {:<12} {}\n",
        "ID", "COMPANY", "POSITION", "STATUS", "APPLIED", "NOTES"
    ));
    out.push_str(&format!("{}\n", "-".repeat(96)));
    for app in records {
        out.push_str(&format!(
            "{:<6} {:<22} {:<26} {:<14} {:<12} {}\n",
            app.id,
            truncate(&app.company, 20),
            truncate(&app.position, 24),
            app.status,
            app.date_applied.to_string(),
            truncate(app.notes.as_deref().unwrap_or(""), 30),
        ));
    }
    out
}

pub fn render_stats(stats: &Statistics) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<14} {:>6}\n", "STATUS", "COUNT"));
    out.push_str(&format!("{}\n", "-".repeat(21)));
    for (status, count) in &stats.by_status {
        out.push_str(&format!("{:<14} {:>6}\n", status.as_str(), count));
    }
    out.push_str(&format!("{}\n", "-".repeat(21)));
    out.push_str(&format!("{:<14} {:>6}\n", "TOTAL", stats.total));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
