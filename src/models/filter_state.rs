//! User's active filter selections
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use models::{FilterKind, FilterOption};

/// Selection held for one attribute.
///
/// JSON form is a two-number array for a range and an array of strings for
/// accepted discrete values, so `[100, 500]` and `["A", "B"]` both round-trip.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum FilterSelection {
    Range(f64, f64),
    Discrete(BTreeSet<String>),
}

/// Attribute key to selection. An absent key leaves the attribute unconstrained.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct FilterState {
    entries: BTreeMap<String, FilterSelection>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state from the string-array representation (`{"brand": ["A", "B"]}`)
    pub fn from_selected_filters(selected: HashMap<String, Vec<String>>) -> Self {
        let mut state = Self::new();
        for (key, values) in selected {
            state.set_discrete(&key, values.into_iter().collect());
        }
        state
    }

    /// String-array representation of the state. Ranges become `[low, high]` strings.
    pub fn to_selected_filters(&self) -> BTreeMap<String, Vec<String>> {
        self.entries
            .iter()
            .map(|(key, selection)| {
                let values = match *selection {
                    FilterSelection::Range(low, high) => vec![low.to_string(), high.to_string()],
                    FilterSelection::Discrete(ref values) => values.iter().cloned().collect(),
                };
                (key.clone(), values)
            }).collect()
    }

    pub fn get(&self, key: &str) -> Option<&FilterSelection> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> btree_map::Iter<String, FilterSelection> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Replaces the accepted values of `key`. An empty set removes the key.
    pub fn set_discrete(&mut self, key: &str, values: BTreeSet<String>) {
        if values.is_empty() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_string(), FilterSelection::Discrete(values));
        }
    }

    /// Replaces the range of `key`, keeping `low <= high`
    pub fn set_range(&mut self, key: &str, low: f64, high: f64) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        self.entries.insert(key.to_string(), FilterSelection::Range(low, high));
    }

    pub fn selected_values(&self, key: &str) -> Option<&BTreeSet<String>> {
        match self.entries.get(key) {
            Some(FilterSelection::Discrete(values)) => Some(values),
            _ => None,
        }
    }

    pub fn range(&self, key: &str) -> Option<(f64, f64)> {
        match self.entries.get(key) {
            Some(FilterSelection::Range(low, high)) => Some((*low, *high)),
            _ => None,
        }
    }

    /// Adds `value` to the accepted values of `key`
    pub fn select_value(&mut self, key: &str, value: &str) {
        let mut values = self.selected_values(key).cloned().unwrap_or_default();
        values.insert(value.to_string());
        self.set_discrete(key, values);
    }

    /// Drops `value` from the accepted values of `key`, removing the key when nothing is left
    pub fn deselect_value(&mut self, key: &str, value: &str) {
        if let Some(mut values) = self.selected_values(key).cloned() {
            values.remove(value);
            self.set_discrete(key, values);
        }
    }

    /// Removes every discrete selection, ranges stay
    pub fn clear_discrete(&mut self) {
        let ranges = self
            .entries
            .iter()
            .filter(|(_, selection)| match selection {
                FilterSelection::Range(..) => true,
                FilterSelection::Discrete(_) => false,
            }).map(|(key, selection)| (key.clone(), selection.clone()))
            .collect();
        self.entries = ranges;
    }

    /// Keeps only selections that still make sense for `options`: keys without an
    /// option and discrete values no longer offered are dropped, kinds must agree.
    pub fn retain_known(&mut self, options: &[FilterOption]) {
        let mut retained = BTreeMap::new();
        for (key, selection) in &self.entries {
            let option = match options.iter().find(|option| &option.key == key) {
                Some(option) => option,
                None => continue,
            };
            match (selection, &option.kind) {
                (FilterSelection::Range(..), FilterKind::Range { .. }) => {
                    retained.insert(key.clone(), selection.clone());
                }
                (FilterSelection::Discrete(values), FilterKind::Discrete { .. }) => {
                    let known: BTreeSet<String> = values.iter().filter(|value| option.offers(value)).cloned().collect();
                    if !known.is_empty() {
                        retained.insert(key.clone(), FilterSelection::Discrete(known));
                    }
                }
                _ => {}
            }
        }
        self.entries = retained;
    }

    /// Sets the initial range of `key` for freshly derived bounds. A range already
    /// held inside `[min, max]` is kept, anything else is replaced by the full bounds.
    pub fn init_range(&mut self, key: &str, min: f64, max: f64) -> (f64, f64) {
        match self.range(key) {
            Some((low, high)) if low >= min && high <= max => (low, high),
            _ => {
                self.set_range(key, min, max);
                (min, max)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json;

    use super::*;
    use models::{AttributeValue, ValueCount};

    fn brand_option() -> FilterOption {
        FilterOption::discrete(
            "brand",
            vec![
                ValueCount {
                    value: AttributeValue::Str("A".to_string()),
                    count: 2,
                },
                ValueCount {
                    value: AttributeValue::Str("B".to_string()),
                    count: 1,
                },
            ],
        )
    }

    #[test]
    fn test_empty_discrete_set_removes_key() {
        let mut state = FilterState::new();
        state.select_value("brand", "A");
        assert_eq!(state.len(), 1);
        state.set_discrete("brand", BTreeSet::new());
        assert!(state.is_empty());
    }

    #[test]
    fn test_deselect_last_value_unconstrains() {
        let mut state = FilterState::new();
        state.select_value("brand", "A");
        state.select_value("brand", "B");
        state.deselect_value("brand", "A");
        assert_eq!(state.selected_values("brand").map(|v| v.len()), Some(1));
        state.deselect_value("brand", "B");
        assert_eq!(state.get("brand"), None);
    }

    #[test]
    fn test_set_range_reorders() {
        let mut state = FilterState::new();
        state.set_range("price", 500.0, 100.0);
        assert_eq!(state.range("price"), Some((100.0, 500.0)));
    }

    #[test]
    fn test_init_range_keeps_range_inside_bounds() {
        let mut state = FilterState::new();
        state.set_range("price", 200.0, 300.0);
        assert_eq!(state.init_range("price", 100.0, 500.0), (200.0, 300.0));
        assert_eq!(state.init_range("price", 250.0, 500.0), (250.0, 500.0));
        assert_eq!(state.range("price"), Some((250.0, 500.0)));
    }

    #[test]
    fn test_retain_known_drops_stale_values_and_keys() {
        let mut state = FilterState::new();
        state.select_value("brand", "A");
        state.select_value("brand", "Z");
        state.select_value("color", "red");
        state.retain_known(&[brand_option()]);
        assert_eq!(state.get("color"), None);
        assert_eq!(state.selected_values("brand").map(|v| v.len()), Some(1));

        let mut mismatched = FilterState::new();
        mismatched.set_range("brand", 1.0, 2.0);
        mismatched.retain_known(&[brand_option()]);
        assert!(mismatched.is_empty());
    }

    #[test]
    fn test_json_forms() {
        let state: FilterState = serde_json::from_str(r#"{"price": [100, 200], "brand": ["A", "B"]}"#).unwrap();
        assert_eq!(state.range("price"), Some((100.0, 200.0)));
        assert_eq!(state.selected_values("brand").map(|v| v.len()), Some(2));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json, json!({"brand": ["A", "B"], "price": [100.0, 200.0]}));
    }

    #[test]
    fn test_selected_filters_conversion() {
        let mut selected = HashMap::new();
        selected.insert("brand".to_string(), vec!["A".to_string()]);
        selected.insert("color".to_string(), vec![]);
        let mut state = FilterState::from_selected_filters(selected);
        assert_eq!(state.len(), 1);
        state.set_range("price", 100.0, 250.5);
        let back = state.to_selected_filters();
        assert_eq!(back["brand"], vec!["A".to_string()]);
        assert_eq!(back["price"], vec!["100".to_string(), "250.5".to_string()]);
    }
}
