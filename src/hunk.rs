use nom::IResult;
use nom::Parser;
use nom::bytes::complete::tag;
use nom::character::complete::u32 as line_number;
use nom::combinator::opt;
use nom::sequence::preceded;

/// A `start,count` pair from one side of a hunk header.
///
/// For additions `start` is a line in the current version, for removals a
/// line in the reference version. A count of zero marks the side that has no
/// lines (pure insertion or pure deletion); `start` is then the anchor line
/// the change sits against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkSpan {
    pub start: u32,
    pub count: u32,
}

/// What kind of change a hunk represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// Only added lines (`removed.count == 0`)
    Add,
    /// Only removed lines (`added.count == 0`)
    Delete,
    /// Both sides present
    Change,
}

/// One contiguous change region from a `-U0` unified diff.
///
/// `start`/`end` are the inclusive line range this hunk occupies in the
/// *current* buffer. For a `Delete` hunk both equal the line the deletion is
/// anchored under (0 when content was removed before the first line). For a
/// `Change` hunk the range covers only the symmetric region,
/// `min(added.count, removed.count)` lines; the overflow tail is reported by
/// [`Hunk::effective_end`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub change_type: ChangeType,
    pub removed: HunkSpan,
    pub added: HunkSpan,
    pub start: u32,
    pub end: u32,
    /// The literal `@@ … @@` line, kept for display and patch reconstruction
    pub header: String,
    /// Body lines with their `+`/`-` prefix intact
    pub lines: Vec<String>,
}

impl Hunk {
    /// Open a new hunk from its `@@` header line, with an empty body.
    ///
    /// Returns `None` if the header does not parse.
    #[must_use]
    pub fn from_header(header: &str) -> Option<Self> {
        let (removed, added) = parse_header(header)?;

        let change_type = if added.count == 0 {
            ChangeType::Delete
        } else if removed.count == 0 {
            ChangeType::Add
        } else {
            ChangeType::Change
        };

        let (start, end) = match change_type {
            ChangeType::Delete => (added.start, added.start),
            ChangeType::Add => (added.start, added.start + added.count - 1),
            ChangeType::Change => {
                let symmetric = added.count.min(removed.count);
                (added.start, added.start + symmetric - 1)
            }
        };

        Some(Hunk {
            change_type,
            removed,
            added,
            start,
            end,
            header: header.to_string(),
            lines: Vec::new(),
        })
    }

    /// Last buffer line this hunk touches, including the inserted tail of a
    /// growing `Change` hunk that extends past the symmetric region.
    #[must_use]
    pub fn effective_end(&self) -> u32 {
        if self.change_type == ChangeType::Change && self.added.count > self.removed.count {
            self.end + (self.added.count - self.removed.count)
        } else {
            self.end
        }
    }

    /// Content of the removed lines, prefixes stripped
    pub fn removed_lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| l.strip_prefix('-'))
    }

    /// Content of the added lines, prefixes stripped
    pub fn added_lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| l.strip_prefix('+'))
    }
}

/// A hunk already present in the staged (index) diff, used when unstaging.
///
/// `remove` addresses the HEAD version, `add` the index version; `lines`
/// carry their `+`/`-` prefixes like [`Hunk::lines`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageChunk {
    pub remove: HunkSpan,
    pub add: HunkSpan,
    pub lines: Vec<String>,
}

fn span(input: &str) -> IResult<&str, HunkSpan> {
    (line_number, opt(preceded(tag(","), line_number)))
        .parse(input)
        .map(|(rest, (start, count))| {
            (
                rest,
                HunkSpan {
                    start,
                    count: count.unwrap_or(1),
                },
            )
        })
}

/// Parse a `@@ -R[,Rc] +A[,Ac] @@` header into removed/added spans.
///
/// An omitted count defaults to 1 per unified-diff convention; trailing
/// context text after the closing `@@` is ignored.
#[must_use]
pub fn parse_header(line: &str) -> Option<(HunkSpan, HunkSpan)> {
    let result: IResult<&str, _> = (tag("@@ -"), span, tag(" +"), span, tag(" @@")).parse(line);
    match result {
        Ok((_, (_, removed, _, added, _))) => Some((removed, added)),
        Err(_) => None,
    }
}

/// Render one side of a hunk header, omitting the count when it is 1
fn span_part(prefix: char, span: &HunkSpan) -> String {
    match span.count {
        1 => format!("{}{}", prefix, span.start),
        n => format!("{}{},{}", prefix, span.start, n),
    }
}

/// Render a `@@ … @@` header from removed/added spans
#[must_use]
pub fn format_header(removed: &HunkSpan, added: &HunkSpan) -> String {
    format!(
        "@@ {} {} @@",
        span_part('-', removed),
        span_part('+', added)
    )
}
