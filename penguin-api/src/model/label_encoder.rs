use std::collections::HashSet;

use crate::error::InferenceError;

/// Bidirectional mapping between class indices and species names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err("label encoder has no classes".to_string());
        }
        let mut seen = HashSet::with_capacity(classes.len());
        if let Some(dup) = classes.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(format!("duplicate class label '{dup}'"));
        }
        Ok(Self { classes })
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

    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    pub fn inverse_transform(&self, index: usize) -> Result<&str, InferenceError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(InferenceError::UnknownClass(index))
    }
}
