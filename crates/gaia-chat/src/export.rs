//! Markdown transcript export.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::history::History;

/// Render the transcript: a header with the export time and turn count,
/// then one `User:` / `Assistant:` block per turn.
pub fn render_markdown(history: &History, exported_at: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str("# Conversation Export\n\n");
    out.push_str(&format!(
        "- **Exported:** {}\n",
        exported_at.format("%Y-%m-%d %H:%M:%S %Z")
    ));
    out.push_str(&format!("- **Turns:** {}\n", history.len()));

    for (i, turn) in history.iter().enumerate() {
        out.push_str(&format!("\n---\n\n## Turn {}\n\n", i + 1));
        out.push_str(&format!("**User:**\n\n{}\n\n", turn.request));
        out.push_str(&format!("**Assistant:**\n\n{}\n", turn.response));
    }

    out
}

/// Write the transcript to `dir/conversation-<YYYYMMDD-HHMMSS>.md` and
/// return the path. The directory is created if needed; an existing file
/// from the same second is never overwritten.
pub fn export_markdown(history: &History, dir: &Path) -> Result<PathBuf, String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("failed to create export dir '{}': {e}", dir.display()))?;

    let now = Local::now();
    let stem = format!("conversation-{}", now.format("%Y%m%d-%H%M%S"));
    let mut path = dir.join(format!("{stem}.md"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{stem}-{n}.md"));
        n += 1;
    }

    std::fs::write(&path, render_markdown(history, now))
        .map_err(|e| format!("failed to write export '{}': {e}", path.display()))?;

    info!(
        "Exported {} turn(s) to {}",
        history.len(),
        path.display()
    );
    Ok(path)
}
