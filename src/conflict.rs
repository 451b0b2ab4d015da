/// A three-way merge conflict region, line numbers 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Line of the `<<<<<<<` marker
    pub start: u32,
    /// Line of the `|||||||` marker, present only under diff3-style merges
    pub common: Option<u32>,
    /// Line of the `=======` marker
    pub sep: u32,
    /// Line of the `>>>>>>>` marker
    pub end: u32,
    /// Revision label captured from the start marker
    pub current: String,
    /// Revision label captured from the end marker
    pub incoming: String,
}

enum State {
    Initial,
    MatchedStart,
    MatchedCommon,
    MatchedSep,
}

enum Marker {
    Start(String),
    Common,
    Sep,
    End(String),
    Plain,
}

fn classify(line: &str) -> Marker {
    if let Some(rest) = line.strip_prefix("<<<<<<<") {
        if rest.is_empty() {
            return Marker::Start(String::new());
        }
        if let Some(label) = rest.strip_prefix(' ') {
            return Marker::Start(label.to_string());
        }
    } else if line == "=======" {
        // Exactly seven: buffers legitimately contain longer `=` runs
        return Marker::Sep;
    } else if let Some(rest) = line.strip_prefix("|||||||") {
        if rest.is_empty() || rest.starts_with(' ') {
            return Marker::Common;
        }
    } else if let Some(rest) = line.strip_prefix(">>>>>>>") {
        if rest.is_empty() {
            return Marker::End(String::new());
        }
        if let Some(label) = rest.strip_prefix(' ') {
            return Marker::End(label.to_string());
        }
    }
    Marker::Plain
}

/// In-progress conflict: everything known before `>>>>>>>` arrives
struct Partial {
    start: u32,
    common: Option<u32>,
    sep: u32,
    current: String,
}

/// Scan buffer lines for conflict-marker blocks.
///
/// A four-state machine over `<<<<<<<`, optional `|||||||`, `=======`,
/// `>>>>>>>`. Malformed sequences are not errors: buffers routinely carry
/// transient or example marker text, so an out-of-place marker just abandons
/// the in-progress block (a fresh `<<<<<<<` always starts over) and scanning
/// continues. Unrelated lines never change state.
pub fn parse_conflicts<S: AsRef<str>>(lines: &[S]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    let mut state = State::Initial;
    let mut partial = Partial {
        start: 0,
        common: None,
        sep: 0,
        current: String::new(),
    };

    for (index, line) in lines.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let lnum = (index + 1) as u32;
        let marker = classify(line.as_ref());

        match (&state, marker) {
            // A start marker begins (or restarts) a block from any state
            (_, Marker::Start(label)) => {
                partial = Partial {
                    start: lnum,
                    common: None,
                    sep: 0,
                    current: label,
                };
                state = State::MatchedStart;
            }
            (State::MatchedStart, Marker::Common) => {
                partial.common = Some(lnum);
                state = State::MatchedCommon;
            }
            (State::MatchedStart | State::MatchedCommon, Marker::Sep) => {
                partial.sep = lnum;
                state = State::MatchedSep;
            }
            // End before the separator: malformed, abandon
            (State::MatchedStart | State::MatchedCommon, Marker::End(_)) => {
                state = State::Initial;
            }
            (State::MatchedSep, Marker::End(label)) => {
                conflicts.push(Conflict {
                    start: partial.start,
                    common: partial.common,
                    sep: partial.sep,
                    end: lnum,
                    current: std::mem::take(&mut partial.current),
                    incoming: label,
                });
                state = State::Initial;
            }
            // A second separator after the first: malformed, abandon
            (State::MatchedSep, Marker::Sep) => {
                state = State::Initial;
            }
            // Content lines and markers that mean nothing here
            _ => {}
        }
    }

    conflicts
}
