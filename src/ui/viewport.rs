//! Viewport management for scrolling the transcript.
//!
//! The [`Viewport`] tracks the visible window of transcript rows. While it
//! follows the tail, new rows keep the newest message in view; scrolling up
//! stops following until the bottom is reached again.

use std::ops::Range;

/// Manages the visible portion of the transcript.
///
/// # Example
///
/// ```
/// use gemtalk::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(80, 10, 0);
/// vp.set_total_lines(25);
/// assert_eq!(vp.visible_range(), 15..25);
///
/// vp.scroll_up(5);
/// assert!(!vp.is_following());
/// vp.set_total_lines(30);
/// assert_eq!(vp.visible_range(), 10..20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    width: u16,
    height: u16,
    offset: usize,
    total_lines: usize,
    follow: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(80, 24, 0)
    }
}

impl Viewport {
    /// Create a viewport that follows the tail.
    pub fn new(width: u16, height: u16, total_lines: usize) -> Self {
        let mut vp = Self {
            width,
            height,
            offset: 0,
            total_lines,
            follow: true,
        };
        vp.offset = vp.max_offset();
        vp
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// Whether new rows keep the view pinned to the bottom.
    pub const fn is_following(&self) -> bool {
        self.follow
    }

    /// Range of visible rows, clamped to the transcript.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.offset.min(self.total_lines);
        let end = (self.offset + self.height as usize).min(self.total_lines);
        start..end
    }

    /// Get the scroll percentage (0-100).
    pub fn scroll_percent(&self) -> u8 {
        let max_offset = self.max_offset();
        if max_offset == 0 {
            return 100;
        }
        // Percentage value always 0-100
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            ((self.offset as f64 / max_offset as f64) * 100.0).round() as u8
        }
    }

    pub const fn can_scroll_up(&self) -> bool {
        self.offset > 0
    }

    pub const fn can_scroll_down(&self) -> bool {
        self.offset < self.max_offset()
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
        self.follow = self.offset >= self.max_offset();
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
        self.follow = self.offset >= self.max_offset();
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page_step());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page_step());
    }

    pub fn go_to_top(&mut self) {
        self.offset = 0;
        self.follow = self.max_offset() == 0;
    }

    /// Jump to the newest rows and resume following.
    pub const fn follow_tail(&mut self) {
        self.offset = self.max_offset();
        self.follow = true;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clamp();
    }

    /// Update the row count after the transcript changed.
    pub fn set_total_lines(&mut self, total: usize) {
        self.total_lines = total;
        self.clamp();
    }

    fn clamp(&mut self) {
        if self.follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    /// One row of overlap between pages.
    fn page_step(&self) -> usize {
        (self.height as usize).saturating_sub(1).max(1)
    }

    const fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_viewport_follows_tail() {
        let vp = Viewport::new(80, 24, 100);
        assert!(vp.is_following());
        assert_eq!(vp.offset(), 76);
        assert_eq!(vp.visible_range(), 76..100);
    }

    #[test]
    fn test_short_transcript_is_fully_visible() {
        let vp = Viewport::new(80, 24, 10);
        assert_eq!(vp.visible_range(), 0..10);
        assert_eq!(vp.scroll_percent(), 100);
        assert!(!vp.can_scroll_up());
        assert!(!vp.can_scroll_down());
    }

    #[test]
    fn test_growth_keeps_tail_in_view_while_following() {
        let mut vp = Viewport::new(80, 10, 5);
        vp.set_total_lines(40);
        assert_eq!(vp.offset(), 30);
        vp.set_total_lines(41);
        assert_eq!(vp.offset(), 31);
    }

    #[test]
    fn test_scrolling_up_stops_following() {
        let mut vp = Viewport::new(80, 10, 40);
        vp.scroll_up(3);
        assert!(!vp.is_following());
        assert_eq!(vp.offset(), 27);
        vp.set_total_lines(60);
        assert_eq!(vp.offset(), 27);
    }

    #[test]
    fn test_reaching_bottom_resumes_following() {
        let mut vp = Viewport::new(80, 10, 40);
        vp.scroll_up(5);
        vp.scroll_down(100);
        assert!(vp.is_following());
        vp.set_total_lines(45);
        assert_eq!(vp.offset(), 35);
    }

    #[test]
    fn test_page_moves_keep_one_row_overlap() {
        let mut vp = Viewport::new(80, 10, 100);
        vp.page_up();
        assert_eq!(vp.offset(), 81);
        vp.page_down();
        assert_eq!(vp.offset(), 90);
        assert!(vp.is_following());
    }

    #[test]
    fn test_go_to_top_and_follow_tail() {
        let mut vp = Viewport::new(80, 10, 100);
        vp.go_to_top();
        assert_eq!(vp.offset(), 0);
        assert!(!vp.is_following());
        assert_eq!(vp.scroll_percent(), 0);
        vp.follow_tail();
        assert_eq!(vp.offset(), 90);
        assert_eq!(vp.scroll_percent(), 100);
    }

    #[test]
    fn test_shrinking_transcript_clamps_offset() {
        let mut vp = Viewport::new(80, 10, 100);
        vp.go_to_top();
        vp.scroll_down(50);
        vp.set_total_lines(20);
        assert_eq!(vp.offset(), 10);
    }

    #[test]
    fn test_resize_keeps_valid_offset() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.go_to_top();
        vp.scroll_down(50);
        vp.resize(80, 60);
        assert_eq!(vp.offset(), 40);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn offset_never_exceeds_bounds(
                total_lines in 0..5000usize,
                height in 1..100u16,
                up in 0..5000usize,
                down in 0..5000usize,
            ) {
                let mut vp = Viewport::new(80, height, total_lines);
                vp.scroll_up(up);
                vp.scroll_down(down);
                prop_assert!(vp.offset() <= total_lines.saturating_sub(height as usize));
                let range = vp.visible_range();
                prop_assert!(range.start <= range.end);
                prop_assert!(range.end <= total_lines);
            }

            #[test]
            fn following_always_shows_last_row(
                start in 0..500usize,
                growth in prop::collection::vec(0..50usize, 0..20),
                height in 1..60u16,
            ) {
                let mut vp = Viewport::new(80, height, start);
                let mut total = start;
                for extra in growth {
                    total += extra;
                    vp.set_total_lines(total);
                    prop_assert!(vp.is_following());
                    prop_assert_eq!(vp.visible_range().end, total);
                }
            }

            #[test]
            fn percent_always_valid(
                total_lines in 0..5000usize,
                height in 1..100u16,
                up in 0..5000usize,
            ) {
                let mut vp = Viewport::new(80, height, total_lines);
                vp.scroll_up(up);
                prop_assert!(vp.scroll_percent() <= 100);
            }
        }
    }
}
