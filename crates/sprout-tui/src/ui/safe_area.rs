//! Safe-area insets.
//!
//! Everything the app draws goes inside `SafeArea::inner`, so content
//! never touches the outer rows and columns of the terminal.

use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeArea {
    pub top: u16,
    pub bottom: u16,
    pub left: u16,
    pub right: u16,
}

impl Default for SafeArea {
    fn default() -> Self {
        Self {
            top: 1,
            bottom: 1,
            left: 2,
            right: 2,
        }
    }
}

impl SafeArea {
    /// The part of `area` left after applying the insets. Insets shrink
    /// proportionally when the area is too small to honor them.
    pub fn inner(&self, area: Rect) -> Rect {
        let (top, bottom) = Self::fit(self.top, self.bottom, area.height);
        let (left, right) = Self::fit(self.left, self.right, area.width);

        Rect::new(
            area.x + left,
            area.y + top,
            area.width - left - right,
            area.height - top - bottom,
        )
    }

    /// Shrink a pair of insets so they leave at least one cell, or none
    /// when `available` is zero.
    fn fit(start: u16, end: u16, available: u16) -> (u16, u16) {
        let total = start.saturating_add(end);
        if total < available {
            return (start, end);
        }
        let budget = available.saturating_sub(1);
        let start_share = if total == 0 {
            0
        } else {
            (u32::from(budget) * u32::from(start) / u32::from(total)) as u16
        };
        (start_share, budget - start_share)
    }
}
