use crate::conflict::Conflict;
use crate::hunk::{Hunk, StageChunk};

/// Find the hunk containing `line` in the current buffer.
///
/// A hunk matches when `start <= line <= effective_end()`; the effective end
/// extends past the symmetric region for a growing `Change` hunk so the
/// extra inserted lines still resolve to their hunk. A deletion anchored
/// above the first line (`start == end == 0`) matches the cursor on line 1,
/// where its sign is drawn.
///
/// Hunks are non-overlapping by construction, so the first match is the only
/// match.
#[must_use]
pub fn hunk_at_line(line: u32, hunks: &[Hunk]) -> Option<&Hunk> {
    if line == 1
        && let Some(top) = hunks.iter().find(|h| h.start == 0 && h.end == 0)
    {
        return Some(top);
    }
    hunks
        .iter()
        .find(|h| h.start <= line && line <= h.effective_end())
}

/// Find the conflict region containing `line`.
///
/// Conflict spans are measured on the live buffer already, so no size-delta
/// correction applies.
#[must_use]
pub fn conflict_at_line(line: u32, conflicts: &[Conflict]) -> Option<&Conflict> {
    conflicts
        .iter()
        .find(|c| c.start <= line && line <= c.end)
}

/// Resolve the staged chunk containing buffer `line`.
///
/// The staged diff (HEAD vs index) and the working diff (index vs buffer)
/// live in different coordinate spaces. The buffer line is translated into
/// index coordinates by subtracting the net size delta of every working hunk
/// that sits entirely above it, then matched against each chunk's `add`
/// span. A pure-deletion chunk (`add.count == 0`) matches only its anchor
/// line.
#[must_use]
pub fn staged_chunk_at_line<'a>(
    line: u32,
    working: &[Hunk],
    staged: &'a [StageChunk],
) -> Option<&'a StageChunk> {
    let mut shift: i64 = 0;
    for hunk in working {
        if hunk.effective_end() < line {
            shift += i64::from(hunk.added.count) - i64::from(hunk.removed.count);
        }
    }

    let target = i64::from(line) - shift;
    let target = u32::try_from(target).ok()?;

    staged.iter().find(|chunk| {
        if chunk.add.count == 0 {
            target == chunk.add.start
        } else {
            chunk.add.start <= target && target <= chunk.add.start + chunk.add.count - 1
        }
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Non-overlapping hunks with realistic header arithmetic, built the
    /// same way a `-U0` diff lays them out (see sign.rs proptests).
    fn arb_hunks() -> impl Strategy<Value = Vec<Hunk>> {
        prop::collection::vec((1u32..4, 0u32..4, 0u32..4), 1..6).prop_map(|specs| {
            let mut hunks = Vec::new();
            let mut old_line = 1u32;
            let mut delta = 0i64;
            for (gap, removed, added) in specs {
                if removed == 0 && added == 0 {
                    continue;
                }
                old_line += gap + removed;
                let header = if removed == 0 {
                    format!(
                        "@@ -{},0 +{},{} @@",
                        old_line,
                        i64::from(old_line) + delta + 1,
                        added
                    )
                } else if added == 0 {
                    format!(
                        "@@ -{},{} +{},0 @@",
                        old_line - removed + 1,
                        removed,
                        i64::from(old_line - removed) + delta
                    )
                } else {
                    format!(
                        "@@ -{},{} +{},{} @@",
                        old_line - removed + 1,
                        removed,
                        i64::from(old_line - removed + 1) + delta,
                        added
                    )
                };
                #[allow(clippy::unwrap_used)]
                hunks.push(Hunk::from_header(&header).unwrap());
                delta += i64::from(added) - i64::from(removed);
            }
            hunks
        })
    }

    proptest! {
        /// Each line inside a hunk's effective span resolves to exactly
        /// that hunk; lines outside every span resolve to nothing.
        #[test]
        fn locator_is_unique_and_contiguous(hunks in arb_hunks()) {
            let max_line = hunks.iter().map(Hunk::effective_end).max().unwrap_or(0) + 3;
            for line in 1..=max_line {
                let owner = hunks
                    .iter()
                    .find(|h| h.start <= line && line <= h.effective_end());
                let located = hunk_at_line(line, &hunks);
                match owner {
                    Some(h) => prop_assert_eq!(located.map(|x| x.header.as_str()), Some(h.header.as_str())),
                    None => prop_assert!(located.is_none()),
                }
            }
        }
    }
}
