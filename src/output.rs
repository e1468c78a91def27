use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::Result;

/// A PR description file: YAML front matter followed by the body.
pub fn pr_file_content(commit_message: &str, base: &str, head: &str, body: &str) -> String {
    format!(
        "---\ntitle: \"{}\"\nbase: {}\nhead: {}\n---\n\n{}",
        commit_message.replace('"', "\\\""),
        base,
        head,
        body
    )
}

/// Write `content` to `<path>.tmp` and rename it over `path`.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    fs::write(tmp, content)?;
    if let Err(e) = fs::rename(tmp, path) {
        let _ = fs::remove_file(tmp);
        return Err(e.into());
    }

    info!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

/// Render and write a PR description file.
pub fn save_pr_file(
    path: &Path,
    commit_message: &str,
    base: &str,
    head: &str,
    body: &str,
) -> Result<()> {
    write_atomic(path, &pr_file_content(commit_message, base, head, body))
}
