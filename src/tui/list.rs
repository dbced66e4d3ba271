/// Selection and scroll state of the card list.
///
/// Indices are card positions in the loaded result list; `visible_cards` is
/// refreshed by the renderer each frame.
pub struct CardListState {
    pub selected: Option<usize>,
    pub scroll_offset: usize,
    pub visible_cards: usize,
}

impl Default for CardListState {
    fn default() -> Self {
        Self {
            selected: None,
            scroll_offset: 0,
            visible_cards: 5,
        }
    }
}

impl CardListState {
    /// Reset for a freshly loaded list
    pub fn reset(&mut self, total: usize) {
        self.selected = if total == 0 { None } else { Some(0) };
        self.scroll_offset = 0;
    }

    pub fn select_next(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        let i = match self.selected {
            Some(i) => (i + 1).min(total - 1),
            None => 0,
        };
        self.selected = Some(i);
        self.ensure_visible(i);
    }

    pub fn select_prev(&mut self) {
        let i = match self.selected {
            Some(0) | None => 0,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
        self.ensure_visible(i);
    }

    pub fn page_down(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        let jump = self.visible_cards.saturating_sub(1).max(1);
        let i = match self.selected {
            Some(i) => (i + jump).min(total - 1),
            None => jump.min(total - 1),
        };
        self.selected = Some(i);
        self.ensure_visible(i);
    }

    pub fn page_up(&mut self) {
        let jump = self.visible_cards.saturating_sub(1).max(1);
        let i = match self.selected {
            Some(i) => i.saturating_sub(jump),
            None => 0,
        };
        self.selected = Some(i);
        self.ensure_visible(i);
    }

    pub fn select_first(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        self.selected = Some(0);
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        self.selected = Some(total - 1);
        self.ensure_visible(total - 1);
    }

    /// Keep the selection in range after the viewport changed size
    pub fn clamp(&mut self, total: usize) {
        match self.selected {
            Some(_) if total == 0 => self.reset(0),
            Some(i) if i >= total => self.select_last(total),
            Some(i) => self.ensure_visible(i),
            None => {}
        }
    }

    fn ensure_visible(&mut self, index: usize) {
        if index < self.scroll_offset {
            self.scroll_offset = index;
        } else if self.visible_cards > 0 && index >= self.scroll_offset + self.visible_cards {
            self.scroll_offset = index + 1 - self.visible_cards;
        }
    }
}
