//! Product records with a per-record, dynamically discovered schema
//!
//! A [`ProductRecord`] is an ordered mapping from attribute name to value.
//! Every record starts with the fixed columns below; characteristics found
//! on the page follow in the order they were extracted.

/// Source URL of the product page
pub const URL: &str = "url";
/// Link target of the product image container
pub const IMAGE: &str = "Image";
/// Product name heading
pub const NAME: &str = "Name";
/// Manufacturer, constant per site configuration
pub const MANUFACTURER: &str = "Manufacturer";
/// Second-to-last breadcrumb entry
pub const CATEGORY: &str = "Category";
/// Last breadcrumb entry
pub const SUBCATEGORY: &str = "Subcategory";
/// Price with the currency suffix removed
pub const PRICE: &str = "Price";
/// Description markup with embedded tables removed
pub const DESCRIPTION: &str = "Description";
/// Raw text of the description node
pub const CHARACTERISTICS: &str = "Characteristics";
/// Raw markup of the characteristics table
pub const CHARACTERISTICS_TABLE: &str = "Characteristics Table";

/// Fixed columns in the order they open every record
pub const FIXED_COLUMNS: [&str; 10] = [
    URL,
    IMAGE,
    NAME,
    MANUFACTURER,
    CATEGORY,
    SUBCATEGORY,
    PRICE,
    DESCRIPTION,
    CHARACTERISTICS,
    CHARACTERISTICS_TABLE,
];

/// Ordered attribute mapping for a single product
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRecord {
    fields: Vec<(String, String)>,
}

impl ProductRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record holding every fixed column with an empty value
    pub fn with_fixed_columns(url: &str) -> Self {
        let mut record = Self::new();
        for column in FIXED_COLUMNS {
            record.insert(column, "");
        }
        record.insert(URL, url);
        record
    }

    /// Sets an attribute
    ///
    /// Assigning a name that already exists replaces the value but keeps the
    /// name at its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Gets an attribute value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute names in record order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Name/value pairs in record order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProductRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_columns_present_and_empty() {
        let record = ProductRecord::with_fixed_columns("https://example.com/p/1");
        assert_eq!(record.len(), FIXED_COLUMNS.len());
        assert_eq!(record.get(URL), Some("https://example.com/p/1"));
        assert_eq!(record.get(PRICE), Some(""));
        assert_eq!(record.names().collect::<Vec<_>>(), FIXED_COLUMNS.to_vec());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = ProductRecord::new();
        record.insert("a", "1");
        record.insert("b", "2");
        record.insert("a", "3");

        assert_eq!(record.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_get_missing() {
        let record = ProductRecord::new();
        assert!(record.get("Color").is_none());
        assert!(record.is_empty());
    }
}
