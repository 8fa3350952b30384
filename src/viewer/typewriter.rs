use std::time::{Duration, Instant};

use unicode_segmentation::UnicodeSegmentation;

/// Grapheme-by-grapheme reveal of a fixed text.
///
/// Holds byte offsets of grapheme ends rather than the text itself; the
/// caller passes the same text back to [`visible`](Self::visible).
#[derive(Debug, Clone)]
pub struct Typewriter {
    boundaries: Vec<usize>,
    interval: Duration,
    started_at: Instant,
    revealed: usize,
}

impl Typewriter {
    pub fn start(text: &str, interval: Duration, now: Instant) -> Self {
        let boundaries = text
            .grapheme_indices(true)
            .map(|(idx, grapheme)| idx + grapheme.len())
            .collect();
        Self {
            boundaries,
            interval,
            started_at: now,
            revealed: 0,
        }
    }

    pub fn advance(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.started_at);
        let due = if self.interval.is_zero() {
            self.boundaries.len()
        } else {
            (elapsed.as_nanos() / self.interval.as_nanos()) as usize
        };
        self.revealed = due.min(self.boundaries.len()).max(self.revealed);
    }

    pub fn finish(&mut self) {
        self.revealed = self.boundaries.len();
    }

    pub fn is_finished(&self) -> bool {
        self.revealed >= self.boundaries.len()
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn visible<'a>(&self, text: &'a str) -> &'a str {
        if self.revealed == 0 {
            return "";
        }
        let end = self.boundaries[self.revealed - 1].min(text.len());
        &text[..end]
    }
}
