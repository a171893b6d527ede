use std::collections::HashSet;
use std::ops::Deref;

/// Ordered feature columns the classifier was trained on.
///
/// Guaranteed non-empty with unique names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelColumns(Vec<String>);

impl ModelColumns {
    pub fn new<I, S>(names: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::try_from(names.into_iter().map(Into::into).collect::<Vec<_>>())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|c| c == name)
    }
}

impl TryFrom<Vec<String>> for ModelColumns {
    type Error = String;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        if names.is_empty() {
            return Err("column schema is empty".to_string());
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate column '{name}'"));
            }
        }
        Ok(Self(names))
    }
}

impl Deref for ModelColumns {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}
