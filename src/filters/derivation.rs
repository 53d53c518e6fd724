//! Filter derivation: computes filterable attributes, their distinct values
//! with counts and the price bounds of a product collection
use std::cmp::Ordering;
use std::collections::HashSet;

use models::{FilterOption, Product, ValueCount, BRAND_KEY, PRICE_KEY};

lazy_static! {
    /// Fields never offered as filters by the generic scope
    pub static ref DEFAULT_EXCLUDED_ATTRIBUTES: HashSet<&'static str> = [
        "id",
        "name",
        "description",
        "image",
        "images",
        "createdAt",
        "updatedAt",
        PRICE_KEY,
    ].iter()
        .cloned()
        .collect();
}

/// Which attributes of a page become discrete filters
#[derive(Clone, Debug, PartialEq)]
pub enum FilterScope {
    /// Page-specific allow-list, in display order
    Only(Vec<String>),
    /// Every attribute except the default exclusions and the listed ones
    Except(Vec<String>),
}

impl Default for FilterScope {
    fn default() -> Self {
        FilterScope::Except(vec![])
    }
}

impl FilterScope {
    pub fn admits(&self, key: &str) -> bool {
        if key == PRICE_KEY {
            return false;
        }
        match *self {
            FilterScope::Only(ref keys) => keys.iter().any(|k| k == key),
            FilterScope::Except(ref keys) => !DEFAULT_EXCLUDED_ATTRIBUTES.contains(key) && !keys.iter().any(|k| k == key),
        }
    }

    /// Candidate keys in derivation order: allow-list order, or first appearance in the collection
    fn candidate_keys(&self, products: &[Product]) -> Vec<String> {
        match *self {
            FilterScope::Only(ref keys) => keys.iter().filter(|key| self.admits(key)).cloned().collect(),
            FilterScope::Except(_) => {
                let mut keys: Vec<String> = vec![];
                for product in products {
                    for key in product.attributes.keys() {
                        if self.admits(key) && !keys.contains(key) {
                            keys.push(key.clone());
                        }
                    }
                }
                keys
            }
        }
    }
}

/// Derives the filter options of `products`: price first, then brand, then the
/// remaining attributes in derivation order. An empty collection has no price option.
pub fn derive_filters(products: &[Product], scope: &FilterScope) -> Vec<FilterOption> {
    let mut options = vec![];

    if let Some((min, max)) = price_bounds(products) {
        options.push(FilterOption::range(PRICE_KEY, min, max));
    }

    let mut discrete: Vec<FilterOption> = scope
        .candidate_keys(products)
        .into_iter()
        .filter_map(|key| discrete_option(products, &key))
        .collect();

    if let Some(position) = discrete.iter().position(|option| option.key == BRAND_KEY) {
        options.push(discrete.remove(position));
    }
    options.extend(discrete);

    debug!(
        "Derived {} filter options from {} products: {:?}",
        options.len(),
        products.len(),
        options.iter().map(|option| option.key.as_str()).collect::<Vec<_>>()
    );

    options
}

/// Minimum and maximum price of the collection, `None` when it is empty
pub fn price_bounds(products: &[Product]) -> Option<(f64, f64)> {
    products
        .iter()
        .map(|product| product.price)
        .filter(|price| price.is_finite())
        .fold(None, |bounds, price| match bounds {
            None => Some((price, price)),
            Some((min, max)) => Some((min.min(price), max.max(price))),
        })
}

fn discrete_option(products: &[Product], key: &str) -> Option<FilterOption> {
    let mut values: Vec<ValueCount> = vec![];

    for value in products.iter().filter_map(|product| product.attribute(key)) {
        let label = value.to_string();
        match values.iter_mut().find(|known| known.value.to_string() == label) {
            Some(known) => known.count += 1,
            None => values.push(ValueCount { value, count: 1 }),
        }
    }

    if values.is_empty() {
        return None;
    }

    sort_values(&mut values);
    Some(FilterOption::discrete(key, values))
}

/// Numeric order when every value is a number, string order of the labels otherwise
fn sort_values(values: &mut Vec<ValueCount>) {
    if values.iter().all(|v| v.value.is_numeric()) {
        values.sort_by(|a, b| {
            let a = a.value.as_f64().unwrap_or_default();
            let b = b.value.as_f64().unwrap_or_default();
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        });
    } else {
        values.sort_by(|a, b| a.value.to_string().cmp(&b.value.to_string()));
    }
}
