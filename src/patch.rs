use error_set::error_set;

use crate::hunk::{ChangeType, Hunk, StageChunk, format_header};

error_set! {
    /// Errors from patch synthesis
    PatchError := {
        /// The cursor line is not inside any change region
        #[display("Line {line} is not positioned in a change chunk")]
        NoChunkAtCursor { line: u32 },
        /// Refusing to build a patch with no body lines: applying it would
        /// be a silent no-op
        #[display("Refusing to synthesize an empty patch")]
        EmptyChunk,
    }
}

/// An edit to apply to the live buffer, 1-based inclusive line range.
///
/// `last < first` means pure insertion before `first` (nothing replaced).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferEdit {
    pub first: u32,
    pub last: u32,
    pub lines: Vec<String>,
}

/// Write the four header lines every synthetic patch shares
fn push_envelope(patch: &mut String, relpath: &str) {
    patch.push_str(&format!("diff --git a/{relpath} b/{relpath}\n"));
    patch.push_str("index 000000..000000 100644\n");
    patch.push_str(&format!("--- a/{relpath}\n"));
    patch.push_str(&format!("+++ b/{relpath}\n"));
}

/// Build a minimal single-hunk patch that stages `hunk` when piped into
/// `git apply --cached --unidiff-zero -`.
///
/// The hunk's original header and body lines are reproduced verbatim inside
/// a synthetic envelope; `--unidiff-zero` is required downstream because the
/// header carries zero context lines.
pub fn stage_patch(relpath: &str, hunk: &Hunk) -> Result<String, PatchError> {
    if hunk.lines.is_empty() {
        return Err(PatchError::EmptyChunk);
    }

    let mut patch = String::new();
    push_envelope(&mut patch, relpath);
    patch.push_str(&hunk.header);
    patch.push('\n');
    for line in &hunk.lines {
        patch.push_str(line);
        patch.push('\n');
    }
    Ok(patch)
}

/// Build the line-reversed patch that unstages an already-staged chunk.
///
/// Every body line keeps its position; only the leading `-`/`+` flips.
/// The header is recomputed with the add/remove spans swapped, since the
/// reversed patch removes what the staged one added.
pub fn unstage_patch(relpath: &str, chunk: &StageChunk) -> Result<String, PatchError> {
    if chunk.lines.is_empty() {
        return Err(PatchError::EmptyChunk);
    }

    let mut patch = String::new();
    push_envelope(&mut patch, relpath);
    patch.push_str(&format_header(&chunk.add, &chunk.remove));
    patch.push('\n');
    for line in &chunk.lines {
        let reversed = match line.as_bytes().first() {
            Some(b'+') => format!("-{}", &line[1..]),
            Some(b'-') => format!("+{}", &line[1..]),
            _ => line.clone(),
        };
        patch.push_str(&reversed);
        patch.push('\n');
    }
    Ok(patch)
}

/// Compute the buffer edit that reverts `hunk` in place, recovering the
/// pre-change text directly without round-tripping through git.
///
/// The hunk's removed-line content replaces the lines it currently occupies;
/// for a `Delete` hunk nothing is replaced and the content is inserted back
/// below the anchor line.
#[must_use]
pub fn chunk_undo(hunk: &Hunk) -> BufferEdit {
    let lines: Vec<String> = hunk.removed_lines().map(str::to_string).collect();
    match hunk.change_type {
        ChangeType::Delete => BufferEdit {
            first: hunk.start + 1,
            last: hunk.start,
            lines,
        },
        _ => BufferEdit {
            first: hunk.start,
            last: hunk.effective_end(),
            lines,
        },
    }
}
