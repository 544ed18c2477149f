use crate::word::{Resolution, Word, WordId};
use std::time::Duration;

/// How a keystroke picks the word it is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum FocusPolicy {
    /// Every word sees the input but only the oldest one can take focus:
    /// enemies have to be cleared in spawn order.
    OldestOnly,
    /// Scan in spawn order and stop at the first word that matches; words
    /// passed over on the way are reset.
    FirstMatch,
}

impl FocusPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            FocusPolicy::OldestOnly
        } else {
            FocusPolicy::FirstMatch
        }
    }
}

/// Result of feeding one candidate buffer to the active words.
#[derive(Debug, Default, PartialEq)]
pub struct Scan {
    /// Word that now owns the input buffer, if any.
    pub focused: Option<WordId>,
    /// Words that left `Falling` during the scan, in spawn order.
    pub resolved: Vec<Resolution>,
}

fn takes_focus(word: &Word) -> bool {
    word.matched_len() > 0
}

pub fn scan_oldest_only(words: &mut [Word], candidate: &str, now: Duration) -> Scan {
    let mut scan = Scan::default();
    for (idx, word) in words.iter_mut().enumerate() {
        if let Some(res) = word.apply_input(candidate, now) {
            scan.resolved.push(res);
        }
        if idx == 0 && takes_focus(word) {
            scan.focused = Some(word.id());
        }
    }
    scan
}

pub fn scan_first_match(words: &mut [Word], candidate: &str, now: Duration) -> Scan {
    let mut scan = Scan::default();
    for word in words.iter_mut() {
        if let Some(res) = word.apply_input(candidate, now) {
            scan.resolved.push(res);
        }
        if takes_focus(word) {
            scan.focused = Some(word.id());
            break;
        }
    }
    scan
}

pub fn apply_key(
    policy: FocusPolicy,
    words: &mut [Word],
    candidate: &str,
    now: Duration,
) -> Scan {
    match policy {
        FocusPolicy::OldestOnly => scan_oldest_only(words, candidate, now),
        FocusPolicy::FirstMatch => scan_first_match(words, candidate, now),
    }
}
