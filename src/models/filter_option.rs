//! Derived descriptions of filterable attributes
use models::AttributeValue;

pub const PRICE_KEY: &str = "price";
pub const BRAND_KEY: &str = "brand";

/// Distinct attribute value and the number of products carrying it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValueCount {
    pub value: AttributeValue,
    pub count: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterKind {
    Discrete { values: Vec<ValueCount> },
    Range { min: f64, max: f64 },
}

/// One filterable attribute. Recomputed as a whole for every loaded collection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FilterOption {
    pub key: String,
    #[serde(flatten)]
    pub kind: FilterKind,
}

impl FilterOption {
    pub fn discrete(key: &str, values: Vec<ValueCount>) -> Self {
        Self {
            key: key.to_string(),
            kind: FilterKind::Discrete { values },
        }
    }

    pub fn range(key: &str, min: f64, max: f64) -> Self {
        Self {
            key: key.to_string(),
            kind: FilterKind::Range { min, max },
        }
    }

    /// `[min, max]` of a range option
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self.kind {
            FilterKind::Range { min, max } => Some((min, max)),
            FilterKind::Discrete { .. } => None,
        }
    }

    /// Discrete values and counts, empty for a range option
    pub fn values(&self) -> &[ValueCount] {
        match self.kind {
            FilterKind::Discrete { ref values } => values,
            FilterKind::Range { .. } => &[],
        }
    }

    /// Whether `value`, in its selection string form, is one of the derived values
    pub fn offers(&self, value: &str) -> bool {
        self.values().iter().any(|v| v.value.to_string() == value)
    }

    pub fn is_range(&self) -> bool {
        self.bounds().is_some()
    }
}
