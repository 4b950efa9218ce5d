use crate::objects::Object;
use std::collections::BTreeMap;

/// A PDF dictionary.
///
/// Keys are kept sorted so that serialization order never depends on
/// insertion order or hashing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dictionary {
    entries: BTreeMap<String, Object>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Object>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Object)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dictionary() {
        let dict = Dictionary::new();
        assert!(dict.is_empty());
        assert_eq!(dict.len(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("Page"));
        dict.set("Count", 1i64);

        assert_eq!(dict.get("Type"), Some(&Object::name("Page")));
        assert_eq!(dict.get("Count"), Some(&Object::Integer(1)));
        assert_eq!(dict.get("Missing"), None);
        assert!(dict.contains_key("Type"));
    }

    #[test]
    fn test_overwrite() {
        let mut dict = Dictionary::new();
        dict.set("Length", 10i64);
        dict.set("Length", 20i64);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("Length"), Some(&Object::Integer(20)));
    }

    #[test]
    fn test_entries_are_sorted() {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("XObject"));
        dict.set("Height", 50u32);
        dict.set("Width", 100u32);
        dict.set("BitsPerComponent", 8u32);

        let keys: Vec<&str> = dict.entries().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["BitsPerComponent", "Height", "Type", "Width"]);
    }
}
