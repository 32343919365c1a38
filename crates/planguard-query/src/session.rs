//! Query session.

use std::collections::HashMap;

/// Per-query context handed to the checkers and the expression analyzer.
///
/// The session is read-only for the duration of a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    query_id: String,
    user: String,
    catalog: Option<String>,
    schema: Option<String>,
    properties: HashMap<String, String>,
}

impl Session {
    /// Creates a session for a query.
    #[must_use]
    pub fn new(query_id: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            user: user.into(),
            catalog: None,
            schema: None,
            properties: HashMap::new(),
        }
    }

    /// Sets the default catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Sets the default schema.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets a session property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Returns the query id.
    #[must_use]
    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    /// Returns the user running the query.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the default catalog.
    #[must_use]
    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    /// Returns the default schema.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Returns a session property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}
