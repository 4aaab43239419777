//! Generic scrollable + filterable list state.

pub struct ScrollableList<T> {
    pub items: Vec<T>,
    pub filtered_indices: Vec<usize>,
    pub selected: usize,
    pub scroll_offset: usize,
    pub filter: String,
    filter_fn: Box<dyn Fn(&T, &str) -> bool + Send + Sync>,
}

impl<T> ScrollableList<T> {
    pub fn new(filter_fn: impl Fn(&T, &str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            items: Vec::new(),
            filtered_indices: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            filter: String::new(),
            filter_fn: Box::new(filter_fn),
        }
    }

    /// Replaces every item. Selection goes back to the first row; the filter
    /// text stays and is re-applied.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.selected = 0;
        self.scroll_offset = 0;
        self.rebuild_filter();
    }

    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.to_string();
        let old_idx = self.filtered_indices.get(self.selected).copied();
        self.rebuild_filter();
        // keep the same item selected if it survived the filter
        self.selected = old_idx
            .and_then(|prev| self.filtered_indices.iter().position(|&i| i == prev))
            .unwrap_or(0);
        self.scroll_offset = 0;
    }

    pub fn rebuild_filter(&mut self) {
        if self.filter.is_empty() {
            self.filtered_indices = (0..self.items.len()).collect();
        } else {
            self.filtered_indices = self
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| (self.filter_fn)(item, &self.filter))
                .map(|(i, _)| i)
                .collect();
        }
        if self.selected >= self.filtered_indices.len() {
            self.selected = self.filtered_indices.len().saturating_sub(1);
        }
    }

    pub fn select_up(&mut self, n: usize) {
        if self.filtered_indices.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        if self.filtered_indices.is_empty() {
            return;
        }
        self.selected = (self.selected + n).min(self.filtered_indices.len().saturating_sub(1));
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.filtered_indices.len().saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&T> {
        let idx = self.filtered_indices.get(self.selected)?;
        self.items.get(*idx)
    }

    /// Returns (original_index, &item) pairs visible in `height` rows.
    /// Call ensure_visible first to update scroll_offset.
    pub fn visible_items(&self, height: usize) -> Vec<(usize, &T)> {
        if height == 0 || self.filtered_indices.is_empty() {
            return Vec::new();
        }
        let start = self.scroll_offset.min(self.filtered_indices.len());
        let end = (start + height).min(self.filtered_indices.len());
        self.filtered_indices[start..end]
            .iter()
            .map(|&i| (i, &self.items[i]))
            .collect()
    }

    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected.saturating_sub(height - 1);
        }
    }

    pub fn len(&self) -> usize {
        self.filtered_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered_indices.is_empty()
    }

    pub fn total_len(&self) -> usize {
        self.items.len()
    }

    pub fn selected_in_view(&self, height: usize) -> usize {
        self.selected
            .saturating_sub(self.scroll_offset)
            .min(height.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> ScrollableList<String> {
        let mut list = ScrollableList::new(|s: &String, q: &str| {
            s.to_lowercase().contains(&q.to_lowercase())
        });
        list.set_items(
            ["Alpha", "Beta", "Gamma", "Delta"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        list
    }

    #[test]
    fn refill_resets_selection_and_keeps_filter() {
        let mut list = names();
        list.set_filter("ta");
        assert_eq!(list.len(), 2);
        list.select_down(1);
        assert_eq!(list.selected_item().map(String::as_str), Some("Delta"));

        list.set_items(vec!["Zeta".into(), "Eta".into(), "Omega".into()]);
        assert_eq!(list.filter, "ta");
        assert_eq!(list.selected, 0);
        assert_eq!(list.selected_item().map(String::as_str), Some("Zeta"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn filter_keeps_surviving_selection() {
        let mut list = names();
        list.select_down(3);
        list.set_filter("l");
        assert_eq!(list.selected_item().map(String::as_str), Some("Delta"));
        list.set_filter("gam");
        assert_eq!(list.selected_item().map(String::as_str), Some("Gamma"));
    }

    #[test]
    fn movement_is_clamped() {
        let mut list = names();
        list.select_up(5);
        assert_eq!(list.selected, 0);
        list.select_down(99);
        assert_eq!(list.selected, 3);
        list.select_first();
        assert_eq!(list.selected, 0);
        list.select_last();
        assert_eq!(list.selected, 3);
    }

    #[test]
    fn window_follows_selection() {
        let mut list = names();
        list.select_last();
        list.ensure_visible(2);
        assert_eq!(list.scroll_offset, 2);
        let visible: Vec<&str> = list
            .visible_items(2)
            .into_iter()
            .map(|(_, s)| s.as_str())
            .collect();
        assert_eq!(visible, ["Gamma", "Delta"]);
        assert_eq!(list.selected_in_view(2), 1);
    }

    #[test]
    fn empty_list_has_no_selection() {
        let mut list: ScrollableList<String> = ScrollableList::new(|_, _| true);
        list.select_down(1);
        assert!(list.selected_item().is_none());
        assert!(list.visible_items(5).is_empty());
    }
}
