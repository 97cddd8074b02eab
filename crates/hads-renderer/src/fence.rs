//! Code fence tracking for line-based preprocessing.
//!
//! Directive lines such as `[[toc]]` are literal text inside fenced code
//! blocks, so the preprocessor has to know when it is inside one.

/// Tracks code fence state during line-by-line processing.
///
/// Fences use three or more backticks or tildes, indented by at most three
/// spaces. A closing fence uses the same character, is at least as long as
/// the opening one and carries no info string.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    /// Character and length of the open fence.
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Update fence state with the next line.
    ///
    /// Returns `true` if the line opened or closed a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let Some(trimmed) = strip_indent(line) else {
            return false;
        };

        match self.open {
            Some((ch, len)) => {
                let closes = fence_run(trimmed)
                    .is_some_and(|(c, n)| c == ch && n >= len && trimmed[n..].trim().is_empty());
                if closes {
                    self.open = None;
                }
                closes
            }
            None => {
                let opening = fence_run(trimmed).filter(|&(c, n)| {
                    // Backtick fences cannot have backticks in the info string.
                    c != '`' || !trimmed[n..].contains('`')
                });
                self.open = opening;
                opening.is_some()
            }
        }
    }
}

/// Strip up to three spaces of indentation; deeper lines are indented code.
pub(crate) fn strip_indent(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        None
    } else {
        Some(&line[indent..])
    }
}

/// Leading run of fence characters, if it is long enough to form a fence.
fn fence_run(line: &str) -> Option<(char, usize)> {
    let first = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let count = line.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}
