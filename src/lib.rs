//! Git diff/patch engine for editor gutter integration.
//!
//! The core is pure: [`diff`] parses `-U0` unified-diff text into typed
//! hunks, [`sign`] projects hunks into per-line gutter annotations,
//! [`locate`] resolves the hunk or conflict under a cursor line, [`patch`]
//! synthesizes minimal single-hunk patches for staging and unstaging, and
//! [`conflict`] recognizes merge-marker blocks. [`cache::Session`] holds the
//! last results per buffer so hosts can skip redundant sign refreshes.
//!
//! [`GitGutter`] wraps the pure engine with the two external collaborators
//! it needs in practice: a diff source (`git diff -U0`) and a patch sink
//! (`git apply --cached --unidiff-zero -`).

use error_set::error_set;
use std::process::Command;

pub mod cache;
pub mod conflict;
pub mod diff;
pub mod hunk;
pub mod locate;
pub mod patch;
pub mod sign;

pub use cache::{BufferId, BufferState, Session};
pub use conflict::Conflict;
pub use diff::{DiffChunks, DiffError};
pub use hunk::{ChangeType, Hunk, HunkSpan, StageChunk};
pub use patch::{BufferEdit, PatchError};
pub use sign::{Sign, SignKind, SignUpdate};

error_set! {
    /// Top-level error for git-gutter operations
    GitGutterError := {
        #[display("No changes found in {file}")]
        NoChanges { file: String },
        #[display("No staged changes found in {file}")]
        NoStagedChanges { file: String },
        #[display("Failed to read {file}: {message}")]
        ReadFailed { file: String, message: String },
        #[display("Failed to write {file}: {message}")]
        WriteFailed { file: String, message: String },
        DiffError(DiffError),
        PatchError(PatchError),
    } || GitCommandError

    /// Errors from git command execution
    GitCommandError := {
        #[display("Failed to run git diff: {message}")]
        DiffFailed { message: String },
        #[display("git diff failed: {stderr}")]
        DiffExitError { stderr: String },
        #[display("Invalid UTF-8 in git diff output: {message}")]
        InvalidUtf8 { message: String },
        #[display("Failed to spawn git apply: {message}")]
        ApplySpawnFailed { message: String },
        #[display("Failed to get stdin handle for git apply")]
        ApplyStdinFailed,
        #[display("Failed to write patch to git apply: {message}")]
        ApplyWriteFailed { message: String },
        #[display("Failed to wait for git apply: {message}")]
        ApplyWaitFailed { message: String },
        #[display("git apply failed: {stderr}")]
        ApplyExitError { stderr: String },
    }
}

/// Process-spawning adapter around the pure engine.
///
/// Paths handed to these methods must be repo-relative: they end up both on
/// the `git diff` command line and inside synthetic patch headers.
pub struct GitGutter<'a> {
    repo_path: &'a str,
}

impl<'a> GitGutter<'a> {
    /// Create a new handle for the given repository path
    #[must_use]
    pub fn new(repo_path: &'a str) -> Self {
        Self { repo_path }
    }

    /// Unstaged change hunks for a file (index vs working tree)
    pub fn hunks(&self, file: &str) -> Result<Vec<Hunk>, GitGutterError> {
        Ok(diff::parse_hunks(&self.raw_diff(file, false)?)?)
    }

    /// Gutter signs and aggregate counts for a file
    pub fn signs(&self, file: &str) -> Result<SignUpdate, GitGutterError> {
        Ok(sign::project(&self.hunks(file)?))
    }

    /// Conflict regions in the on-disk file content
    pub fn conflicts(&self, file: &str) -> Result<Vec<Conflict>, GitGutterError> {
        let content = self.read_file(file)?;
        let lines: Vec<&str> = content.lines().collect();
        Ok(conflict::parse_conflicts(&lines))
    }

    /// Stage the hunk containing `line`.
    ///
    /// # Examples
    /// ```no_run
    /// # use git_gutter::GitGutter;
    /// let gutter = GitGutter::new(".");
    /// gutter.stage("flake.nix", 137).unwrap();
    /// ```
    pub fn stage(&self, file: &str, line: u32) -> Result<(), GitGutterError> {
        let hunks = self.hunks(file)?;
        if hunks.is_empty() {
            return Err(GitGutterError::NoChanges {
                file: file.to_string(),
            });
        }
        let hunk =
            locate::hunk_at_line(line, &hunks).ok_or(PatchError::NoChunkAtCursor { line })?;
        let patch = patch::stage_patch(file, hunk)?;
        Ok(self.apply_patch(&patch)?)
    }

    /// Unstage the staged hunk containing `line`.
    ///
    /// `line` addresses the working buffer; the staged diff lives in index
    /// coordinates, so the lookup reconciles the two through the unstaged
    /// hunk list before reversing the chunk.
    pub fn unstage(&self, file: &str, line: u32) -> Result<(), GitGutterError> {
        let working = diff::parse_hunks(&self.raw_diff(file, false)?)?;
        let staged = diff::parse_staged(&self.raw_diff(file, true)?)?;
        let chunks = staged
            .get(file)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| GitGutterError::NoStagedChanges {
                file: file.to_string(),
            })?;
        let chunk = locate::staged_chunk_at_line(line, &working, chunks)
            .ok_or(PatchError::NoChunkAtCursor { line })?;
        let patch = patch::unstage_patch(file, chunk)?;
        Ok(self.apply_patch(&patch)?)
    }

    /// Revert the hunk containing `line` in the working file, restoring the
    /// indexed content for that region without touching git.
    pub fn revert(&self, file: &str, line: u32) -> Result<(), GitGutterError> {
        let hunks = self.hunks(file)?;
        let hunk =
            locate::hunk_at_line(line, &hunks).ok_or(PatchError::NoChunkAtCursor { line })?;
        let edit = patch::chunk_undo(hunk);

        let content = self.read_file(file)?;
        let had_final_newline = content.ends_with('\n');
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

        let insert_at = (edit.first as usize).saturating_sub(1).min(lines.len());
        if edit.last >= edit.first {
            let upto = (edit.last as usize).min(lines.len());
            lines.splice(insert_at..upto, edit.lines);
        } else {
            lines.splice(insert_at..insert_at, edit.lines);
        }

        let mut output = lines.join("\n");
        if had_final_newline && !output.is_empty() {
            output.push('\n');
        }
        self.write_file(file, &output)
    }

    /// Get raw git diff output with zero context lines
    fn raw_diff(&self, file: &str, staged: bool) -> Result<String, GitCommandError> {
        let mut args = vec!["-C", self.repo_path, "diff"];
        if staged {
            args.push("--cached");
        }
        args.extend(["--no-ext-diff", "-U0", "--no-color", "--", file]);

        let output =
            Command::new("git")
                .args(&args)
                .output()
                .map_err(|e| GitCommandError::DiffFailed {
                    message: e.to_string(),
                })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitCommandError::DiffExitError {
                stderr: stderr.into_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| GitCommandError::InvalidUtf8 {
            message: e.to_string(),
        })
    }

    /// Apply a synthetic patch to the git index
    fn apply_patch(&self, patch: &str) -> Result<(), GitCommandError> {
        use std::io::Write;

        let mut child = Command::new("git")
            .args([
                "-C",
                self.repo_path,
                "apply",
                "--cached",
                "--unidiff-zero",
                "-",
            ])
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| GitCommandError::ApplySpawnFailed {
                message: e.to_string(),
            })?;

        child
            .stdin
            .take()
            .ok_or(GitCommandError::ApplyStdinFailed)?
            .write_all(patch.as_bytes())
            .map_err(|e| GitCommandError::ApplyWriteFailed {
                message: e.to_string(),
            })?;

        let output = child
            .wait_with_output()
            .map_err(|e| GitCommandError::ApplyWaitFailed {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitCommandError::ApplyExitError {
                stderr: stderr.into_owned(),
            });
        }

        Ok(())
    }

    fn read_file(&self, file: &str) -> Result<String, GitGutterError> {
        std::fs::read_to_string(std::path::Path::new(self.repo_path).join(file)).map_err(|e| {
            GitGutterError::ReadFailed {
                file: file.to_string(),
                message: e.to_string(),
            }
        })
    }

    fn write_file(&self, file: &str, content: &str) -> Result<(), GitGutterError> {
        std::fs::write(std::path::Path::new(self.repo_path).join(file), content).map_err(|e| {
            GitGutterError::WriteFailed {
                file: file.to_string(),
                message: e.to_string(),
            }
        })
    }
}
