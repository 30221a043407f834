use std::collections::HashMap;

/// One row. `None` is SQL NULL; an absent key reads as NULL too.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, Option<String>>,
}

impl Record {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn from_values(values: Vec<(String, Option<String>)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|value| value.as_deref())
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        self.values.insert(name.into(), value);
    }

    pub fn all_values(&self) -> &HashMap<String, Option<String>> {
        &self.values
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Missing keys are ignored.
    pub fn remove_value(&mut self, name: &str) -> Option<String> {
        self.values.remove(name).flatten()
    }

    pub fn rename_value(&mut self, old_name: &str, new_name: &str) {
        if let Some(value) = self.values.remove(old_name) {
            self.values.insert(new_name.to_string(), value);
        }
    }
}
