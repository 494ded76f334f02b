use crossterm::event::{KeyCode, KeyEvent};
use rentour_core::{
    filter::{self, Criteria},
    models::{Car, FilterKey, Listing, Tour},
};

use crate::{
    format::format_currency,
    input::{ListCursor, TextInput},
};

/// Label of the "no constraint" choice in every filter.
pub const ANY: &str = "Any";

/// What the app should do after a browse-screen key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseOutcome {
    Ignored,
    Handled,
    Status(String),
    GlobalSearch(String),
    Back,
}

/// Per-kind rendering details for the browse screen.
pub trait Describe: Listing {
    /// Secondary text on the list row.
    fn subtitle(&self) -> String;

    /// `(label, value)` pairs for the details pane.
    fn details(&self, currency: &str) -> Vec<(&'static str, String)>;
}

impl Describe for Car {
    fn subtitle(&self) -> String {
        [self.category.as_deref(), self.location.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" · ")
    }

    fn details(&self, currency: &str) -> Vec<(&'static str, String)> {
        let mut rows = vec![("Car", self.display_name())];
        push_opt(&mut rows, "Type", self.category.clone());
        push_opt(&mut rows, "Transmission", self.transmission.clone());
        push_opt(&mut rows, "Fuel", self.fuel_type.clone());
        push_opt(
            &mut rows,
            "Seats",
            self.seating_capacity.map(|seats| seats.to_string()),
        );
        push_opt(&mut rows, "Location", self.location.clone());
        rows.push((
            "Rate",
            format!("{}/day", format_currency(currency, self.price())),
        ));
        if !self.features.is_empty() {
            rows.push(("Features", self.features.join(", ")));
        }
        push_opt(&mut rows, "About", self.description.clone());
        rows
    }
}

impl Describe for Tour {
    fn subtitle(&self) -> String {
        [self.destination.as_deref(), self.duration.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" · ")
    }

    fn details(&self, currency: &str) -> Vec<(&'static str, String)> {
        let mut rows = vec![("Tour", self.title.clone())];
        push_opt(&mut rows, "Destination", self.destination.clone());
        push_opt(&mut rows, "Duration", self.duration.clone());
        push_opt(&mut rows, "Category", self.category.clone());
        push_opt(&mut rows, "Difficulty", self.difficulty.clone());
        push_opt(&mut rows, "Group size", self.group_size.clone());
        rows.push(("Price", format_currency(currency, self.price())));
        if let Some(rating) = self.rating {
            let reviews = self.review_count.unwrap_or(0);
            rows.push(("Rating", format!("{rating:.1} ({reviews} reviews)")));
        }
        if !self.inclusions.is_empty() {
            rows.push(("Includes", self.inclusions.join(", ")));
        }
        push_opt(&mut rows, "About", self.description.clone());
        rows
    }
}

fn push_opt(rows: &mut Vec<(&'static str, String)>, label: &'static str, value: Option<String>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        rows.push((label, value));
    }
}

/// Public listing screen state for one kind of record.
pub struct Browser<T: Listing> {
    items: Vec<T>,
    results: Vec<T>,
    options: Vec<(FilterKey, Vec<String>)>,
    criteria: Criteria,
    search: TextInput,
    editing: bool,
    focus: usize,
    pub list: ListCursor,
}

impl<T: Describe> Browser<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut browser = Self {
            items: Vec::new(),
            results: Vec::new(),
            options: Vec::new(),
            criteria: Criteria::new(),
            search: TextInput::default(),
            editing: false,
            focus: 0,
            list: ListCursor::default(),
        };
        browser.set_items(items);
        browser
    }

    /// Swap in a fresh set of listed records, keeping the criteria.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.options = T::FILTER_KEYS
            .iter()
            .map(|key| (*key, filter::options(*key, &items)))
            .collect();
        self.items = items;
        self.refilter();
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn current(&self) -> Option<&T> {
        self.results.get(self.list.selected())
    }

    pub fn search_input(&self) -> &TextInput {
        &self.search
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn focused_key(&self) -> FilterKey {
        T::FILTER_KEYS[self.focus % T::FILTER_KEYS.len()]
    }

    /// Current choice for `key`, [`ANY`] when unconstrained.
    pub fn value_label(&self, key: FilterKey) -> &str {
        match self.criteria.get(key) {
            "" => ANY,
            value => value,
        }
    }

    pub fn set_search(&mut self, query: &str) {
        self.search.set(query);
        self.criteria.set(FilterKey::Search, query.trim());
        self.refilter();
    }

    pub fn clear(&mut self) {
        self.criteria.clear();
        self.search.clear();
        self.refilter();
    }

    pub fn focus_next(&mut self, delta: isize) {
        let len = T::FILTER_KEYS.len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
    }

    /// Step the focused filter through `Any` followed by its options.
    pub fn cycle_value(&mut self, delta: isize) {
        let key = self.focused_key();
        let Some((_, options)) = self.options.iter().find(|(candidate, _)| *candidate == key)
        else {
            return;
        };
        let current = options
            .iter()
            .position(|option| option == self.criteria.get(key))
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let slots = options.len() as isize + 1;
        let next = (current as isize + delta).rem_euclid(slots) as usize;
        let value = if next == 0 {
            String::new()
        } else {
            options[next - 1].clone()
        };
        self.criteria.set(key, value);
        self.refilter();
    }

    fn refilter(&mut self) {
        self.results = filter::apply(&self.items, &self.criteria);
        self.list.clamp(self.results.len());
    }

    fn handle_search_key(&mut self, key: &KeyEvent) -> BrowseOutcome {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.editing = false;
                BrowseOutcome::Status(format!("{} matching", self.results.len()))
            }
            _ => {
                if self.search.handle_key(key) {
                    self.criteria
                        .set(FilterKey::Search, self.search.value().trim());
                    self.list.reset();
                    self.refilter();
                }
                BrowseOutcome::Handled
            }
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> BrowseOutcome {
        if self.editing {
            return self.handle_search_key(key);
        }
        if self.list.handle_key(key, self.results.len()) {
            return BrowseOutcome::Handled;
        }
        match key.code {
            KeyCode::Char('/') => {
                self.editing = true;
                BrowseOutcome::Status("Type to search, Enter to finish".to_string())
            }
            KeyCode::Tab => {
                self.focus_next(1);
                BrowseOutcome::Handled
            }
            KeyCode::BackTab => {
                self.focus_next(-1);
                BrowseOutcome::Handled
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.cycle_value(-1);
                BrowseOutcome::Handled
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.cycle_value(1);
                BrowseOutcome::Handled
            }
            KeyCode::Char('x') => {
                self.clear();
                BrowseOutcome::Status("Filters cleared".to_string())
            }
            KeyCode::Char('s') => BrowseOutcome::GlobalSearch(self.search.value().to_string()),
            KeyCode::Esc => BrowseOutcome::Back,
            _ => BrowseOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use rentour_core::catalog::Catalog;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn cycling_starts_and_ends_at_any() {
        let mut browser = Browser::new(Catalog::fixtures().listed_cars());
        let total = browser.results().len();
        assert_eq!(browser.focused_key(), FilterKey::Brand);
        assert_eq!(browser.value_label(FilterKey::Brand), ANY);

        browser.cycle_value(1);
        assert_eq!(browser.value_label(FilterKey::Brand), "Toyota");
        assert!(browser.results().iter().all(|car| car.brand == "Toyota"));

        browser.cycle_value(-1);
        assert_eq!(browser.value_label(FilterKey::Brand), ANY);
        assert_eq!(browser.results().len(), total);

        browser.cycle_value(-1);
        assert_ne!(browser.value_label(FilterKey::Brand), ANY);
    }

    #[test]
    fn typing_filters_live() {
        let mut browser = Browser::new(Catalog::fixtures().listed_tours());
        browser.handle_key(&press(KeyCode::Char('/')));
        assert!(browser.is_editing());
        for ch in "palawan".chars() {
            browser.handle_key(&press(KeyCode::Char(ch)));
        }
        assert_eq!(browser.results().len(), 2);
        assert_eq!(
            browser.handle_key(&press(KeyCode::Char('s'))),
            BrowseOutcome::Handled
        );
        browser.handle_key(&press(KeyCode::Backspace));
        browser.handle_key(&press(KeyCode::Enter));
        assert!(!browser.is_editing());
        assert_eq!(
            browser.handle_key(&press(KeyCode::Char('s'))),
            BrowseOutcome::GlobalSearch("palawan".to_string())
        );

        browser.handle_key(&press(KeyCode::Char('x')));
        assert!(browser.criteria().is_default());
        assert_eq!(browser.results().len(), browser.total());
    }

    #[test]
    fn focus_wraps_over_kind_filters() {
        let mut browser = Browser::new(Catalog::fixtures().listed_tours());
        browser.focus_next(-1);
        assert_eq!(browser.focused_key(), FilterKey::PriceRange);
        browser.handle_key(&press(KeyCode::Tab));
        assert_eq!(browser.focused_key(), FilterKey::Category);
    }
}
