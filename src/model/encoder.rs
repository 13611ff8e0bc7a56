use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{LeafError, Result};

/// Bijection between class indices `0..len()` and label strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Builds an encoder; labels must be non-empty and unique.
    pub fn new(classes: Vec<String>) -> std::result::Result<Self, String> {
        let encoder = LabelEncoder { classes };
        encoder.validate()?;
        Ok(encoder)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.classes.is_empty() {
            return Err("encoder has no classes".into());
        }
        let mut seen = HashSet::new();
        for label in &self.classes {
            if !seen.insert(label.as_str()) {
                return Err(format!("label '{}' appears more than once", label));
            }
        }
        Ok(())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Index → label.
    pub fn inverse_transform(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(LeafError::UnknownClassIndex { index, class_count: self.classes.len() })
    }

    /// Label → index.
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc() -> LabelEncoder {
        LabelEncoder::new(vec!["healthy".into(), "late_blight".into()]).unwrap()
    }

    #[test]
    fn maps_both_ways() {
        let e = enc();
        assert_eq!(e.inverse_transform(1).unwrap(), "late_blight");
        assert_eq!(e.transform("healthy"), Some(0));
        assert_eq!(e.transform("mosaic"), None);
    }

    #[test]
    fn out_of_range_index_is_unknown() {
        assert!(matches!(
            enc().inverse_transform(2),
            Err(LeafError::UnknownClassIndex { index: 2, class_count: 2 })
        ));
    }

    #[test]
    fn duplicates_and_empty_are_rejected() {
        assert!(LabelEncoder::new(vec![]).is_err());
        assert!(LabelEncoder::new(vec!["a".into(), "a".into()]).is_err());
    }
}
