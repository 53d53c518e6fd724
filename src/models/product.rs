//! Product records as delivered by the product source
use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde_json;

use models::filter_option::PRICE_KEY;

/// Stable product identifier. Sources deliver it either as a string or as an integer.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'a> From<&'a str> for ProductId {
    fn from(id: &'a str) -> Self {
        ProductId(id.to_string())
    }
}

struct ProductIdVisitor;

impl<'de> Visitor<'de> for ProductIdVisitor {
    type Value = ProductId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or an integer product id")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<ProductId, E> {
        Ok(ProductId(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<ProductId, E> {
        Ok(ProductId(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<ProductId, E> {
        Ok(ProductId(value.to_string()))
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ProductIdVisitor)
    }
}

/// Value of a single filterable attribute
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum AttributeValue {
    Num(f64),
    Str(String),
}

impl AttributeValue {
    /// Reads a raw record field. Nulls, empty strings, arrays and objects carry no filterable value.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match *value {
            serde_json::Value::String(ref s) if !s.is_empty() => Some(AttributeValue::Str(s.clone())),
            serde_json::Value::Number(ref n) => n.as_f64().map(AttributeValue::Num),
            serde_json::Value::Bool(b) => Some(AttributeValue::Str(b.to_string())),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            AttributeValue::Num(n) => Some(n),
            AttributeValue::Str(ref s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        match *self {
            AttributeValue::Num(_) => true,
            AttributeValue::Str(_) => false,
        }
    }
}

/// String form used for selections: `8.0` reads as `8`, strings stay untouched
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AttributeValue::Num(n) => write!(f, "{}", n),
            AttributeValue::Str(ref s) => write!(f, "{}", s),
        }
    }
}

/// Product record. Every field apart from `id` and `price` lands in `attributes`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub price: f64,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Product {
    pub fn new(id: &str, price: f64) -> Self {
        Self {
            id: ProductId::from(id),
            price,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder style helper, mostly for fixtures
    pub fn with_attribute<V: Into<serde_json::Value>>(mut self, key: &str, value: V) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Filterable value of the field named `key`, `price` included
    pub fn attribute(&self, key: &str) -> Option<AttributeValue> {
        if key == PRICE_KEY {
            return Some(AttributeValue::Num(self.price));
        }
        self.attributes.get(key).and_then(AttributeValue::from_json)
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(|name| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json;

    use super::*;

    #[test]
    fn test_product_from_raw_record() {
        let product: Product =
            serde_json::from_str(r#"{"id": 7, "price": 250, "brand": "A", "memory": 64, "image": null}"#).unwrap();
        assert_eq!(product.id, ProductId("7".to_string()));
        assert_eq!(product.price, 250.0);
        assert_eq!(product.attribute("brand"), Some(AttributeValue::Str("A".to_string())));
        assert_eq!(product.attribute("memory"), Some(AttributeValue::Num(64.0)));
        assert_eq!(product.attribute("image"), None);
        assert_eq!(product.attribute("color"), None);
        assert_eq!(product.attribute("price"), Some(AttributeValue::Num(250.0)));
    }

    #[test]
    fn test_number_display_drops_trailing_zero() {
        assert_eq!(AttributeValue::Num(8.0).to_string(), "8");
        assert_eq!(AttributeValue::Num(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_empty_string_is_no_value() {
        assert_eq!(AttributeValue::from_json(&json!("")), None);
        assert_eq!(AttributeValue::from_json(&json!(true)), Some(AttributeValue::Str("true".to_string())));
    }
}
