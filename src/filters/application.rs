//! Filter application: stable selection of the products matching a `FilterState`
use models::{FilterSelection, FilterState, Product, PRICE_KEY};

/// Products passing every active selection, in their original order
pub fn apply_filters<'a>(products: &'a [Product], state: &FilterState) -> Vec<&'a Product> {
    products.iter().filter(|product| matches(product, state)).collect()
}

/// AND across attributes
pub fn matches(product: &Product, state: &FilterState) -> bool {
    state.iter().all(|(key, selection)| selection_matches(product, key, selection))
}

fn selection_matches(product: &Product, key: &str, selection: &FilterSelection) -> bool {
    match *selection {
        FilterSelection::Range(low, high) => {
            let value = if key == PRICE_KEY {
                Some(product.price)
            } else {
                product.attribute(key).and_then(|value| value.as_f64())
            };
            value.map_or(false, |value| value >= low && value <= high)
        }
        // an empty set never constrains
        FilterSelection::Discrete(ref values) if values.is_empty() => true,
        FilterSelection::Discrete(ref values) => product
            .attribute(key)
            .map_or(false, |value| values.contains(&value.to_string())),
    }
}
