use std::collections::HashMap;

use crate::conflict::{self, Conflict};
use crate::hunk::Hunk;
use crate::locate;
use crate::sign::{self, SignUpdate};

/// Host-assigned buffer identity
pub type BufferId = u64;

/// Last computed engine results for one buffer.
///
/// Hunk and conflict lists are replaced wholesale on every recomputation,
/// never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferState {
    pub hunks: Vec<Hunk>,
    pub signs: SignUpdate,
    pub conflicts: Vec<Conflict>,
    /// Set while the last scan found marker blocks; cleared when a scan
    /// comes back empty so cheap refreshes can skip the parser entirely
    pub has_conflicts: bool,
}

/// Per-buffer engine state, keyed by buffer identity.
///
/// Owned by whatever drives the engine; there is no process-wide singleton.
/// Each buffer's state is independent, and everything tied to a buffer is
/// released together when it closes.
#[derive(Debug, Default)]
pub struct Session {
    buffers: HashMap<BufferId, BufferState>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a buffer's hunk list with a freshly parsed one.
    ///
    /// Signs are only recomputed when the list actually changed; returns
    /// whether downstream sign consumers need a refresh. Feeding the same
    /// diff twice is a no-op, which keeps redundant recomputation safe.
    pub fn update_hunks(&mut self, buf: BufferId, hunks: Vec<Hunk>) -> bool {
        let state = self.buffers.entry(buf).or_default();
        if state.hunks == hunks {
            return false;
        }
        state.signs = sign::project(&hunks);
        state.hunks = hunks;
        true
    }

    /// Rescan a buffer's lines for conflict regions; returns whether any
    /// were found.
    pub fn update_conflicts<S: AsRef<str>>(&mut self, buf: BufferId, lines: &[S]) -> bool {
        let state = self.buffers.entry(buf).or_default();
        state.conflicts = conflict::parse_conflicts(lines);
        state.has_conflicts = !state.conflicts.is_empty();
        state.has_conflicts
    }

    /// Cheap refresh: rescan only buffers already known to contain markers.
    ///
    /// A file without conflict markers is the overwhelmingly common case, so
    /// this is the variant to call on every content change once a full scan
    /// (or an external signal such as entering a merge) has run.
    pub fn refresh_conflicts_if_present<S: AsRef<str>>(
        &mut self,
        buf: BufferId,
        lines: &[S],
    ) -> bool {
        let known = self.buffers.get(&buf).is_some_and(|s| s.has_conflicts);
        if !known {
            return false;
        }
        self.update_conflicts(buf, lines)
    }

    #[must_use]
    pub fn hunks(&self, buf: BufferId) -> &[Hunk] {
        self.buffers.get(&buf).map_or(&[], |s| &s.hunks)
    }

    #[must_use]
    pub fn signs(&self, buf: BufferId) -> Option<&SignUpdate> {
        self.buffers.get(&buf).map(|s| &s.signs)
    }

    #[must_use]
    pub fn conflicts(&self, buf: BufferId) -> &[Conflict] {
        self.buffers.get(&buf).map_or(&[], |s| &s.conflicts)
    }

    /// Hunk under the cursor in this buffer, if any
    #[must_use]
    pub fn hunk_at(&self, buf: BufferId, line: u32) -> Option<&Hunk> {
        locate::hunk_at_line(line, self.hunks(buf))
    }

    /// Conflict region under the cursor in this buffer, if any
    #[must_use]
    pub fn conflict_at(&self, buf: BufferId, line: u32) -> Option<&Conflict> {
        locate::conflict_at_line(line, self.conflicts(buf))
    }

    /// Release all state for a closed buffer
    pub fn close(&mut self, buf: BufferId) {
        self.buffers.remove(&buf);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diff::parse_hunks;
    use similar_asserts::assert_eq;

    #[test]
    fn first_update_refreshes_signs() {
        let mut session = Session::new();
        let hunks = parse_hunks("@@ -3,1 +3,1 @@\n-old\n+new\n").unwrap();
        assert!(session.update_hunks(7, hunks));
        assert_eq!(session.signs(7).unwrap().changed, 1);
    }

    #[test]
    fn identical_update_short_circuits() {
        let mut session = Session::new();
        let diff = "@@ -3,1 +3,1 @@\n-old\n+new\n";
        assert!(session.update_hunks(7, parse_hunks(diff).unwrap()));
        // Same diff again: no sign refresh needed
        assert!(!session.update_hunks(7, parse_hunks(diff).unwrap()));
    }

    #[test]
    fn changed_update_replaces_wholesale() {
        let mut session = Session::new();
        session.update_hunks(7, parse_hunks("@@ -3,1 +3,1 @@\n-old\n+new\n").unwrap());
        assert!(session.update_hunks(7, parse_hunks("@@ -8,0 +9,2 @@\n+a\n+b\n").unwrap()));
        assert_eq!(session.hunks(7).len(), 1);
        assert_eq!(session.hunks(7)[0].start, 9);
        assert_eq!(session.signs(7).unwrap().added, 2);
    }

    #[test]
    fn buffers_are_independent() {
        let mut session = Session::new();
        session.update_hunks(1, parse_hunks("@@ -3,1 +3,1 @@\n-o\n+n\n").unwrap());
        session.update_hunks(2, parse_hunks("@@ -8,0 +9 @@\n+a\n").unwrap());
        assert_eq!(session.hunks(1)[0].start, 3);
        assert_eq!(session.hunks(2)[0].start, 9);
    }

    #[test]
    fn close_releases_everything() {
        let mut session = Session::new();
        session.update_hunks(7, parse_hunks("@@ -3 +3 @@\n-o\n+n\n").unwrap());
        session.update_conflicts(7, &["<<<<<<< HEAD", "a", "=======", "b", ">>>>>>> x"]);
        session.close(7);
        assert!(session.hunks(7).is_empty());
        assert!(session.signs(7).is_none());
        assert!(session.conflicts(7).is_empty());
    }

    #[test]
    fn conflict_flag_tracks_scan_results() {
        let mut session = Session::new();
        let conflicted = ["<<<<<<< HEAD", "a", "=======", "b", ">>>>>>> x"];
        let clean = ["just", "text"];

        assert!(session.update_conflicts(7, &conflicted));
        assert_eq!(session.conflicts(7).len(), 1);

        // Markers resolved: flag clears, cheap refreshes now skip the scan
        assert!(!session.update_conflicts(7, &clean));
        assert!(!session.refresh_conflicts_if_present(7, &conflicted));
        assert!(session.conflicts(7).is_empty());

        // Until a full scan notices them again; cheap refreshes then run
        assert!(session.update_conflicts(7, &conflicted));
        assert!(!session.refresh_conflicts_if_present(7, &clean));
        assert!(session.conflicts(7).is_empty());
    }

    #[test]
    fn locator_accessors() {
        let mut session = Session::new();
        session.update_hunks(7, parse_hunks("@@ -8,0 +9,2 @@\n+a\n+b\n").unwrap());
        session.update_conflicts(7, &["<<<<<<< HEAD", "a", "=======", "b", ">>>>>>> x"]);
        assert!(session.hunk_at(7, 10).is_some());
        assert!(session.hunk_at(7, 11).is_none());
        assert!(session.conflict_at(7, 3).is_some());
        assert!(session.conflict_at(7, 6).is_none());
    }
}
