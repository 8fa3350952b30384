//! Looping carousel index math.
//!
//! Three interchangeable ways of presenting a finite list as an endless,
//! center-focused carousel: plain modulo stepping, a small window of slots
//! around the active item, and a tripled track that teleports back to its
//! middle copy once scrolling settles.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Steps `active` by `delta` around a ring of `len` items.
pub fn wrap_index(active: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    (active as isize + delta).rem_euclid(len) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSlot {
    pub offset: isize,
    pub index: usize,
}

/// Slots centered on `active`, at most `range` each side and never more
/// than `len` distinct items.
pub fn window(active: usize, len: usize, range: usize) -> Vec<WindowSlot> {
    if len == 0 {
        return Vec::new();
    }
    let left = range.min((len - 1) / 2);
    let right = range.min(len - 1 - left);
    (-(left as isize)..=right as isize)
        .map(|offset| WindowSlot {
            offset,
            index: wrap_index(active, offset, len),
        })
        .collect()
}

/// Maps a position on the tripled track back into the middle copy.
pub fn normalize_virtual(virtual_index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if virtual_index < len || virtual_index >= 2 * len {
        virtual_index % len + len
    } else {
        virtual_index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Teleport {
    pub from: usize,
    pub to: usize,
}

/// The list rendered three times back to back (`3 * len` virtual slots).
///
/// Scrolling moves freely across all three copies. Each scroll re-arms a
/// settle deadline; once it passes without further scrolling, [`poll`]
/// snaps the position back into the middle copy without animation.
///
/// [`poll`]: TriplicatedTrack::poll
#[derive(Debug, Clone)]
pub struct TriplicatedTrack {
    len: usize,
    virtual_index: usize,
    settle: Duration,
    settle_at: Option<Instant>,
}

impl TriplicatedTrack {
    pub fn new(len: usize, settle: Duration) -> Self {
        Self {
            len,
            virtual_index: len,
            settle,
            settle_at: None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn virtual_index(&self) -> usize {
        self.virtual_index
    }

    pub fn logical(&self) -> usize {
        if self.len == 0 {
            0
        } else {
            self.virtual_index % self.len
        }
    }

    pub fn has_pending_teleport(&self) -> bool {
        self.settle_at.is_some()
    }

    /// Moves by `delta` slots. Running off either end of the track wraps
    /// around, which lands on the same logical item as a teleport would.
    pub fn scroll_by(&mut self, delta: isize, now: Instant) {
        if self.len == 0 {
            return;
        }
        let target = wrap_index(self.virtual_index, delta, 3 * self.len);
        self.scroll_to(target, now);
    }

    pub fn scroll_to(&mut self, virtual_index: usize, now: Instant) {
        if self.len == 0 {
            return;
        }
        self.virtual_index = virtual_index.min(3 * self.len - 1);
        self.settle_at = Some(now + self.settle);
    }

    /// Jumps straight to a logical item in the middle copy.
    pub fn select_logical(&mut self, index: usize) {
        if self.len == 0 {
            return;
        }
        self.virtual_index = self.len + index % self.len;
        self.settle_at = None;
    }

    /// Fires the pending teleport once the settle deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Teleport> {
        let deadline = self.settle_at?;
        if now < deadline {
            return None;
        }
        self.settle_at = None;
        let to = normalize_virtual(self.virtual_index, self.len);
        if to == self.virtual_index {
            return None;
        }
        let from = self.virtual_index;
        self.virtual_index = to;
        Some(Teleport { from, to })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CarouselMode {
    #[default]
    Modulo,
    Track,
}

/// Selection over the visible letters, wrapping at both ends.
#[derive(Debug, Clone)]
pub struct Carousel {
    len: usize,
    active: usize,
    track: Option<TriplicatedTrack>,
}

impl Carousel {
    pub fn new(len: usize, mode: CarouselMode, settle: Duration) -> Self {
        let track = match mode {
            CarouselMode::Modulo => None,
            CarouselMode::Track => Some(TriplicatedTrack::new(len, settle)),
        };
        Self {
            len,
            active: 0,
            track,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Active position, `None` when there is nothing to select.
    pub fn active(&self) -> Option<usize> {
        if self.len == 0 {
            None
        } else {
            Some(self.active)
        }
    }

    pub fn mode(&self) -> CarouselMode {
        if self.track.is_some() {
            CarouselMode::Track
        } else {
            CarouselMode::Modulo
        }
    }

    pub fn track(&self) -> Option<&TriplicatedTrack> {
        self.track.as_ref()
    }

    pub fn next(&mut self) {
        self.advance_at(1, Instant::now());
    }

    pub fn previous(&mut self) {
        self.advance_at(-1, Instant::now());
    }

    pub fn advance_at(&mut self, delta: isize, now: Instant) {
        if self.len == 0 {
            return;
        }
        match self.track.as_mut() {
            Some(track) => {
                track.scroll_by(delta, now);
                self.active = track.logical();
            }
            None => self.active = wrap_index(self.active, delta, self.len),
        }
    }

    /// Selects an item directly. Positions past the end are treated as
    /// virtual track slots and folded back to their logical item.
    pub fn select(&mut self, position: usize) {
        if self.len == 0 {
            return;
        }
        let logical = normalize_virtual(position, self.len) - self.len;
        self.active = logical;
        if let Some(track) = self.track.as_mut() {
            track.select_logical(logical);
        }
    }

    pub fn window(&self, range: usize) -> Vec<WindowSlot> {
        window(self.active, self.len, range)
    }

    /// Drives any pending track teleport; returns it when one fired.
    pub fn settle(&mut self, now: Instant) -> Option<Teleport> {
        let teleport = self.track.as_mut()?.poll(now)?;
        tracing::trace!(from = teleport.from, to = teleport.to, "carousel teleport");
        Some(teleport)
    }
}
