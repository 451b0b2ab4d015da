use crate::hunk::{ChangeType, Hunk};

/// Kind of gutter annotation for one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignKind {
    Add,
    Change,
    Delete,
    /// Deletion anchored above the first line; drawn on line 1
    TopDelete,
    /// Trailing line of a `Change` hunk that removed more than it added
    ChangeDelete,
}

impl SignKind {
    /// Single-character symbol for plain-text rendering
    #[must_use]
    pub fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Change => '~',
            Self::Delete => '_',
            Self::TopDelete => '‾',
            Self::ChangeDelete => '≃',
        }
    }
}

/// A per-line gutter annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sign {
    pub line: u32,
    pub kind: SignKind,
}

/// Signs plus aggregate counts for a whole buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpdate {
    pub signs: Vec<Sign>,
    pub added: u32,
    pub changed: u32,
    pub removed: u32,
}

/// Expand a hunk list into per-line sign annotations and aggregate counts.
///
/// Pure and total: an empty hunk list yields empty output with zero counters.
///
/// A `Change` hunk contributes `min(added.count, removed.count)` to `changed`
/// and the remainder to whichever side is larger; its trailing line becomes
/// `ChangeDelete` when the hunk shrank the buffer, and extra `Add` signs
/// cover the inserted tail when it grew.
#[must_use]
pub fn project(hunks: &[Hunk]) -> SignUpdate {
    let mut update = SignUpdate::default();

    for hunk in hunks {
        match hunk.change_type {
            ChangeType::Add => {
                update.added += hunk.added.count;
                for line in hunk.start..=hunk.end {
                    update.signs.push(Sign {
                        line,
                        kind: SignKind::Add,
                    });
                }
            }
            ChangeType::Delete => {
                update.removed += hunk.removed.count;
                // There is no line 0: a deletion above the first line is
                // drawn on line 1 as TopDelete
                let sign = if hunk.start == 0 {
                    Sign {
                        line: 1,
                        kind: SignKind::TopDelete,
                    }
                } else {
                    Sign {
                        line: hunk.start,
                        kind: SignKind::Delete,
                    }
                };
                update.signs.push(sign);
            }
            ChangeType::Change => {
                let added = hunk.added.count;
                let removed = hunk.removed.count;
                update.changed += added.min(removed);

                for line in hunk.start..=hunk.end {
                    let kind = if removed > added && line == hunk.end {
                        SignKind::ChangeDelete
                    } else {
                        SignKind::Change
                    };
                    update.signs.push(Sign { line, kind });
                }

                if added > removed {
                    update.added += added - removed;
                    for line in hunk.end + 1..=hunk.effective_end() {
                        update.signs.push(Sign {
                            line,
                            kind: SignKind::Add,
                        });
                    }
                } else if removed > added {
                    update.removed += removed - added;
                }
            }
        }
    }

    update
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::diff::parse_hunks;
    use crate::hunk::ChangeType;
    use proptest::prelude::*;

    /// Generate a well-formed `-U0` diff and its expected per-side totals.
    ///
    /// Simulates a real diff: old/new cursors advance together, every hunk
    /// starts past the previous one, counts stay consistent with the
    /// running size delta. Line 1 is always untouched, so deletions never
    /// anchor above the first line (that case would let a TopDelete share
    /// line 1 with a following delete sign, which is legal but breaks the
    /// uniqueness check below; it has its own unit test).
    fn arb_diff() -> impl Strategy<Value = String> {
        prop::collection::vec((1u32..4, 0u32..4, 0u32..4), 1..6).prop_map(|specs| {
            let mut text = String::new();
            let mut old_line = 1u32;
            let mut delta = 0i64;
            for (gap, removed, added) in specs {
                if removed == 0 && added == 0 {
                    continue;
                }
                old_line += gap + removed;
                let (old_part, new_part) = if removed == 0 {
                    // Insertion after old_line
                    (
                        format!("-{},0", old_line),
                        format!("+{},{}", (i64::from(old_line) + delta + 1), added),
                    )
                } else if added == 0 {
                    (
                        format!("-{},{}", old_line - removed + 1, removed),
                        format!("+{},0", (i64::from(old_line - removed)) + delta),
                    )
                } else {
                    (
                        format!("-{},{}", old_line - removed + 1, removed),
                        format!("+{},{}", (i64::from(old_line - removed + 1)) + delta, added),
                    )
                };
                text.push_str(&format!("@@ {} {} @@\n", old_part, new_part));
                for _ in 0..removed {
                    text.push_str("-old\n");
                }
                for _ in 0..added {
                    text.push_str("+new\n");
                }
                delta += i64::from(added) - i64::from(removed);
            }
            text
        })
    }

    proptest! {
        /// `added - changed` style count conservation: the aggregate
        /// counters must equal the sums recomputed from the hunk spans.
        #[test]
        fn counts_conserved(diff in arb_diff()) {
            let hunks = parse_hunks(&diff).unwrap();
            let update = project(&hunks);

            let mut added = 0u32;
            let mut changed = 0u32;
            let mut removed = 0u32;
            for hunk in &hunks {
                let a = hunk.added.count;
                let r = hunk.removed.count;
                match hunk.change_type {
                    ChangeType::Add => added += a,
                    ChangeType::Delete => removed += r,
                    ChangeType::Change => {
                        changed += a.min(r);
                        if a > r {
                            added += a - r;
                        } else {
                            removed += r - a;
                        }
                    }
                }
            }

            prop_assert_eq!(update.added, added);
            prop_assert_eq!(update.changed, changed);
            prop_assert_eq!(update.removed, removed);
        }

        /// Every hunk produces signs covering exactly its effective span
        /// (deletions collapse to one sign), and sign lines never repeat.
        #[test]
        fn sign_lines_cover_spans(diff in arb_diff()) {
            let hunks = parse_hunks(&diff).unwrap();
            let update = project(&hunks);

            let expected: usize = hunks
                .iter()
                .map(|h| match h.change_type {
                    ChangeType::Delete => 1,
                    _ => (h.effective_end() - h.start + 1) as usize,
                })
                .sum();
            prop_assert_eq!(update.signs.len(), expected);

            let mut lines: Vec<u32> = update.signs.iter().map(|s| s.line).collect();
            let before = lines.len();
            lines.sort_unstable();
            lines.dedup();
            prop_assert_eq!(lines.len(), before, "duplicate sign lines");
        }
    }
}
