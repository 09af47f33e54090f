use crate::models::{SortOrder, Toy};

/// What produced the rows currently in the grid. Drives the title and the
/// reset-search affordance.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Listing {
    All,
    Search(String),
    Sorted(SortOrder),
}

/// The toy grid: the latest result set plus the highlighted row.
pub(crate) struct ToyTable {
    pub(crate) toys: Vec<Toy>,
    pub(crate) listing: Listing,
    pub(crate) selected: usize,
}

impl ToyTable {
    pub(crate) fn new(toys: Vec<Toy>) -> Self {
        Self {
            toys,
            listing: Listing::All,
            selected: 0,
        }
    }

    /// Swap in a fresh result set. The whole grid is replaced; the cursor
    /// follows `focus_id` when that toy is still present.
    pub(crate) fn replace(&mut self, toys: Vec<Toy>, listing: Listing, focus_id: Option<i64>) {
        self.toys = toys;
        self.listing = listing;
        if let Some(idx) = focus_id.and_then(|id| self.toys.iter().position(|toy| toy.id == id)) {
            self.selected = idx;
        }
        self.ensure_in_bounds();
    }

    pub(crate) fn current_toy(&self) -> Option<&Toy> {
        self.toys.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.toys.is_empty() {
            return;
        }
        let len = self.toys.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.toys.len().saturating_sub(1);
    }

    pub(crate) fn is_search(&self) -> bool {
        matches!(self.listing, Listing::Search(_))
    }

    fn ensure_in_bounds(&mut self) {
        if self.toys.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.toys.len() {
            self.selected = self.toys.len() - 1;
        }
    }

    /// Grid title describing the current listing.
    pub(crate) fn title(&self) -> String {
        match &self.listing {
            Listing::All => format!("Toys ({})", self.toys.len()),
            Listing::Search(keyword) => {
                format!("Toys matching \"{keyword}\" ({})", self.toys.len())
            }
            Listing::Sorted(order) => format!("Toys ({}) • {order}", self.toys.len()),
        }
    }
}

/// The sort-criterion selector: twelve field/direction choices.
pub(crate) struct SortPicker {
    pub(crate) options: Vec<SortOrder>,
    pub(crate) selected: usize,
}

impl SortPicker {
    /// Open the picker with `current` highlighted.
    pub(crate) fn new(current: SortOrder) -> Self {
        let options = SortOrder::all();
        let selected = options
            .iter()
            .position(|order| *order == current)
            .unwrap_or(0);
        Self { options, selected }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = self.options.len() as isize;
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + offset).rem_euclid(len) as usize;
    }

    pub(crate) fn current(&self) -> SortOrder {
        self.options
            .get(self.selected)
            .copied()
            .unwrap_or_default()
    }
}
