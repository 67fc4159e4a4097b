/// How many posts of the selected list are revealed. Grows by `page_size`
/// each time the last revealed item scrolls into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListState {
    total: usize,
    page_size: usize,
    visible: usize,
}

impl ListState {
    pub fn new(total: usize, page_size: usize) -> Self {
        ListState {
            total,
            page_size,
            visible: page_size.min(total),
        }
    }

    /// Restores a reveal count carried by a request. Never below the initial count, never above `total`.
    pub fn with_visible(total: usize, page_size: usize, requested: Option<usize>) -> Self {
        let mut state = Self::new(total, page_size);
        if let Some(requested) = requested {
            state.visible = requested.clamp(state.visible, total);
        }
        state
    }

    pub fn has_more(&self) -> bool {
        self.total > self.visible
    }

    /// Returns `false` when everything was already revealed.
    pub fn reveal_more(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        self.visible = self.next_visible();
        true
    }

    pub fn next_visible(&self) -> usize {
        (self.visible + self.page_size).min(self.total)
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_never_exceeds_total() {
        assert_eq!(ListState::new(3, 10).visible(), 3);
        assert_eq!(ListState::new(25, 10).visible(), 10);
        assert_eq!(ListState::new(0, 10).visible(), 0);
        assert!(!ListState::new(0, 10).has_more());
    }

    #[test]
    fn test_reveal_more() {
        let mut state = ListState::new(25, 10);
        assert!(state.has_more());
        assert_eq!(state.next_visible(), 20);

        assert!(state.reveal_more());
        assert_eq!(state.visible(), 20);
        assert!(state.reveal_more());
        assert_eq!(state.visible(), 25);
        assert!(!state.has_more());

        assert!(!state.reveal_more());
        assert_eq!(state.visible(), 25);
    }

    #[test]
    fn test_reveal_never_decreases() {
        let mut state = ListState::new(47, 7);
        let mut last = state.visible();
        for _ in 0..20 {
            state.reveal_more();
            assert!(state.visible() >= last);
            assert!(state.visible() <= state.total());
            last = state.visible();
        }
        assert_eq!(last, 47);
    }

    #[test]
    fn test_with_visible_is_clamped() {
        assert_eq!(ListState::with_visible(25, 10, None).visible(), 10);
        assert_eq!(ListState::with_visible(25, 10, Some(20)).visible(), 20);
        assert_eq!(ListState::with_visible(25, 10, Some(3)).visible(), 10);
        assert_eq!(ListState::with_visible(25, 10, Some(300)).visible(), 25);
        assert_eq!(ListState::with_visible(4, 10, Some(300)).visible(), 4);
    }
}
