// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-image property table. Keys are unique and case-sensitive; the last
// write wins and absent keys simply read as `None`.

use super::Image;

impl Image {
    /// Insert or overwrite a property.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Look up a property. Unknown keys are not an error.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Remove a property, returning its previous value.
    pub fn remove_property(&mut self, key: &str) -> Option<String> {
        self.properties.remove(key)
    }

    /// Snapshot of every `(key, value)` pair, in key order.
    pub fn properties(&self) -> Vec<(String, String)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Visit every property in key order.
    pub fn each_property(&self, mut visit: impl FnMut(&str, &str)) {
        for (k, v) in &self.properties {
            visit(k, v);
        }
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn canvas() -> Image {
        Image::new(20, 20).unwrap()
    }

    #[test]
    fn set_get_and_enumerate() {
        let mut img = canvas();
        img.set_property("a", "string1");
        img.set_property("b", "string2");
        img.set_property("c", "string3");

        assert_eq!(img.property("a"), Some("string1"));
        assert_eq!(img.property("b"), Some("string2"));
        assert_eq!(img.property("c"), Some("string3"));
        assert_eq!(img.property("d"), None);

        let props = img.properties();
        assert_eq!(props.len(), 3);

        let known: HashMap<&str, &str> =
            [("a", "string1"), ("b", "string2"), ("c", "string3")].into();
        let mut visited = 0;
        img.each_property(|k, v| {
            assert_eq!(known.get(k), Some(&v));
            visited += 1;
        });
        assert_eq!(visited, 3);
    }

    #[test]
    fn empty_table_enumerates_nothing() {
        let img = canvas();
        assert!(img.properties().is_empty());
        img.each_property(|_, _| panic!("no properties expected"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let mut img = canvas();
        img.set_property("Key", "upper");
        img.set_property("key", "lower");
        assert_eq!(img.property_count(), 2);
        assert_eq!(img.property("Key"), Some("upper"));
        assert_eq!(img.property("KEY"), None);
    }

    #[test]
    fn remove_returns_previous_value() {
        let mut img = canvas();
        img.set_property("comment", "hello");
        assert_eq!(img.remove_property("comment").as_deref(), Some("hello"));
        assert_eq!(img.remove_property("comment"), None);
    }

    #[test]
    fn properties_do_not_affect_equality() {
        let plain = canvas();
        let mut tagged = canvas();
        tagged.set_property("label", "x");
        assert_eq!(plain, tagged);
    }

    proptest! {
        #[test]
        fn last_write_wins(entries in proptest::collection::vec((".{0,8}", ".{0,16}"), 0..24)) {
            let mut img = canvas();
            let mut expected = HashMap::new();
            for (k, v) in &entries {
                img.set_property(k.clone(), v.clone());
                expected.insert(k.clone(), v.clone());
            }
            prop_assert_eq!(img.property_count(), expected.len());
            for (k, v) in img.properties() {
                prop_assert_eq!(expected.get(&k), Some(&v));
            }
            for (k, v) in &expected {
                prop_assert_eq!(img.property(k), Some(v.as_str()));
            }
        }
    }
}
