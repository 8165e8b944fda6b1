//! Task metric recording and the epic summary report.

use chrono::{SecondsFormat, Utc};

use crate::domain::{ProjectState, TaskMetric};

/// Append a metric for the finished attempt and refresh the totals.
///
/// Recording is non-fatal by design; callers log a warning on any later
/// error rather than failing the task.
pub fn record_task_metrics(
    state: &mut ProjectState,
    task_id: &str,
    outcome: &str,
    duration_seconds: u64,
) {
    state.metrics.tasks.push(TaskMetric {
        task_id: task_id.to_string(),
        outcome: outcome.to_string(),
        duration_seconds,
        completed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    });
    update_metric_totals(state);
}

/// Recompute `total_tasks_completed` and `total_duration_seconds` from the
/// full metric list. Overwrites stored totals, so repeated calls are safe.
pub fn update_metric_totals(state: &mut ProjectState) {
    state.metrics.total_tasks_completed = state.metrics.tasks.len() as u64;
    state.metrics.total_duration_seconds =
        state.metrics.tasks.iter().map(|t| t.duration_seconds).sum();
}

/// Print the box-draw summary table for the completed epic.
pub fn print_epic_summary(state: &ProjectState) {
    let total = state.metrics.total_tasks_completed;
    let total_seconds = state.metrics.total_duration_seconds;
    let avg_seconds = if total > 0 { total_seconds / total } else { 0 };

    const LINE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
    println!("\n{LINE}");
    println!("EPIC SUMMARY");
    println!("{LINE}");
    println!("  {:<22} {}", "Total Tasks:", total);
    println!("  {:<22} {}", "Total Time:", format_duration(total_seconds));
    println!("  {:<22} {avg_seconds}s per task", "Average Time:");
    println!("{LINE}\n");
}

/// Render seconds as "45s", "3m 15s", or "1h 2m 30s".
fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;

    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}
