// src/workflow/navigator.rs
use serde::Serialize;
use std::fmt;
use std::num::NonZeroU8;

/// Results page currently shown, counted from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PageCursor(u8);

impl PageCursor {
    pub const FIRST: PageCursor = PageCursor(1);

    /// A cursor on `page`, if it lies within `1..=total`.
    pub fn new(page: u8, total: NonZeroU8) -> Option<Self> {
        (1..=total.get()).contains(&page).then_some(Self(page))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// 0-based position, for indexing page content.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Next page, wrapping from the last page back to the first.
pub fn advance(current: PageCursor, total: NonZeroU8) -> PageCursor {
    PageCursor(current.0 % total.get() + 1)
}

pub fn reset() -> PageCursor {
    PageCursor::FIRST
}
