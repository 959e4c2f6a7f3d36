use serde_json::Value as JsonValue;

use crate::document::Document;

/// Arguments delivered to every listener of a schema channel.
///
/// Lifecycle events carry the affected document; `change:<field>` also carries
/// the field's new value as the first extra value. Custom events may carry any
/// combination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventArgs {
    document: Option<Document>,
    values: Vec<JsonValue>,
}

impl EventArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_document(document: Document) -> Self {
        Self {
            document: Some(document),
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn value(&self, index: usize) -> Option<&JsonValue> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[JsonValue] {
        &self.values
    }
}
