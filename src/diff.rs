use error_set::error_set;
use std::collections::HashMap;

use crate::hunk::{Hunk, StageChunk, parse_header};

error_set! {
    /// Errors from parsing unified-diff text
    DiffError := {
        /// A `@@` line that does not parse as a hunk header
        #[display("Malformed hunk header '{header}'")]
        MalformedHeader { header: String },
        /// A body line appeared before any `@@` header
        #[display("Unexpected line before first hunk header: '{line}'")]
        UnexpectedLine { line: String },
        /// A file section in a staged diff carries no usable path
        #[display("Missing file path in staged diff")]
        MissingPath,
    }
}

/// Staged hunks keyed by repo-relative path
pub type DiffChunks = HashMap<String, Vec<StageChunk>>;

/// Parse single-file `-U0` diff text into an ordered hunk list.
///
/// The per-file header lines (`diff --git`, `index`, `---`, `+++`, mode
/// changes) before the first `@@` are ignored; empty input means "no diff"
/// and yields an empty list. Any other line before the first `@@` is a
/// malformed diff and fails the whole call; nothing partial is returned.
///
/// Hunks come out in diff order, which for a line-based diff is ascending
/// line order already. No sorting happens here: a reordering pass would only
/// hide malformed input.
pub fn parse_hunks(diff: &str) -> Result<Vec<Hunk>, DiffError> {
    let mut hunks: Vec<Hunk> = Vec::new();

    for line in diff.lines() {
        if line.starts_with("@@") {
            let hunk = Hunk::from_header(line).ok_or_else(|| DiffError::MalformedHeader {
                header: line.to_string(),
            })?;
            hunks.push(hunk);
        } else if line.is_empty() {
            // Trailing blank line of the diff text; never hunk content
        } else if let Some(open) = hunks.last_mut() {
            // Everything after a header belongs to that hunk, including
            // "\ No newline at end of file" markers
            open.lines.push(line.to_string());
        } else if !is_file_header(line) {
            return Err(DiffError::UnexpectedLine {
                line: line.to_string(),
            });
        }
    }

    Ok(hunks)
}

/// Lines git emits ahead of the first hunk of a file
fn is_file_header(line: &str) -> bool {
    line.starts_with("diff --git ")
        || line.starts_with("index ")
        || line.starts_with("--- ")
        || line.starts_with("+++ ")
        || line.starts_with("new file mode")
        || line.starts_with("deleted file mode")
        || line.starts_with("old mode")
        || line.starts_with("new mode")
}

/// Parse a full (possibly multi-file) `git diff --cached -U0` output into
/// staged chunks keyed by path.
///
/// Splits on `diff --git` boundaries; within a file section everything up to
/// the first `@@` is header and skipped.
pub fn parse_staged(diff: &str) -> Result<DiffChunks, DiffError> {
    let mut chunks = DiffChunks::new();
    let mut current = String::new();

    for line in diff.lines() {
        if line.starts_with("diff --git ") {
            if !current.is_empty() {
                parse_staged_file(&current, &mut chunks)?;
            }
            current.clear();
        }
        if !current.is_empty() || line.starts_with("diff --git ") {
            current.push_str(line);
            current.push('\n');
        }
    }
    if !current.is_empty() {
        parse_staged_file(&current, &mut chunks)?;
    }

    Ok(chunks)
}

/// Parse one `diff --git` section into its path and staged chunks
fn parse_staged_file(text: &str, out: &mut DiffChunks) -> Result<(), DiffError> {
    // Deleted files only carry a usable path on the `---` side
    let path = text
        .lines()
        .find_map(|l| l.strip_prefix("+++ b/"))
        .or_else(|| text.lines().find_map(|l| l.strip_prefix("--- a/")))
        .filter(|p| !p.is_empty())
        .ok_or(DiffError::MissingPath)?
        .to_string();

    let mut file_chunks: Vec<StageChunk> = Vec::new();
    for line in text.lines() {
        if line.starts_with("@@") {
            let (remove, add) = parse_header(line).ok_or_else(|| DiffError::MalformedHeader {
                header: line.to_string(),
            })?;
            file_chunks.push(StageChunk {
                remove,
                add,
                lines: Vec::new(),
            });
        } else if let Some(open) = file_chunks.last_mut()
            && !line.is_empty()
        {
            open.lines.push(line.to_string());
        }
    }

    out.insert(path, file_chunks);
    Ok(())
}
