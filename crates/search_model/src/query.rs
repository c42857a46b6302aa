use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{domain::ItemId, error::ModelError};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_AGGREGATION_LIMIT: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    Term,
    Range,
    Geo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterApplication {
    AtLeastOne,
    #[default]
    MustAll,
    MustAllWithLevels,
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub values: Vec<String>,
    #[serde(default)]
    pub kind: FilterKind,
    #[serde(default)]
    pub application: FilterApplication,
}

impl Filter {
    pub fn term(field: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            values,
            kind: FilterKind::Term,
            application: FilterApplication::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "direction", rename_all = "snake_case")]
pub enum AggregationSort {
    Term(SortDirection),
    Count(SortDirection),
}

impl Default for AggregationSort {
    fn default() -> Self {
        Self::Term(SortDirection::Desc)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationRequest {
    pub name: String,
    pub field: String,
    #[serde(default)]
    pub application: FilterApplication,
    #[serde(default)]
    pub sort: AggregationSort,
    pub limit: u16,
}

impl AggregationRequest {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            application: FilterApplication::default(),
            sort: AggregationSort::default(),
            limit: DEFAULT_AGGREGATION_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// A search request. Treated as immutable once shared: every change goes
/// through a fresh `clone()` that is patched and then handed to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryValue {
    pub text: String,
    #[serde(default)]
    pub filters: BTreeMap<String, Filter>,
    #[serde(default)]
    pub aggregations: BTreeMap<String, AggregationRequest>,
    pub page: u32,
    pub size: u32,
    #[serde(default)]
    pub sort: Vec<SortBy>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub searchable_fields: Vec<String>,
    #[serde(default)]
    pub highlights_enabled: bool,
    #[serde(default)]
    pub suggestions_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion_count: Option<u32>,
    #[serde(default)]
    pub promoted: Vec<ItemId>,
    #[serde(default)]
    pub excluded: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Default for QueryValue {
    fn default() -> Self {
        Self::match_all()
    }
}

impl QueryValue {
    pub fn match_all() -> Self {
        Self {
            text: String::new(),
            filters: BTreeMap::new(),
            aggregations: BTreeMap::new(),
            page: 1,
            size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
            fields: Vec::new(),
            searchable_fields: Vec::new(),
            highlights_enabled: false,
            suggestions_enabled: false,
            suggestion_count: None,
            promoted: Vec::new(),
            excluded: Vec::new(),
            min_score: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), ModelError> {
        if page == 0 {
            return Err(ModelError::InvalidPage(page));
        }
        self.page = page;
        Ok(())
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    /// Sets the filter named `name`. An empty value list removes the filter.
    pub fn filter_by(
        &mut self,
        name: impl Into<String>,
        field: impl Into<String>,
        values: Vec<String>,
        application: FilterApplication,
    ) {
        let name = name.into();
        if values.is_empty() {
            self.filters.remove(&name);
            return;
        }
        self.filters.insert(
            name,
            Filter {
                field: field.into(),
                values,
                kind: FilterKind::Term,
                application,
            },
        );
    }

    pub fn remove_filter(&mut self, name: &str) -> Option<Filter> {
        self.filters.remove(name)
    }

    pub fn active_filter_values(&self, name: &str) -> &[String] {
        self.filters
            .get(name)
            .map(|filter| filter.values.as_slice())
            .unwrap_or_default()
    }

    pub fn aggregate_by(&mut self, request: AggregationRequest) {
        self.aggregations.insert(request.name.clone(), request);
    }

    pub fn enable_suggestions(&mut self) {
        self.suggestions_enabled = true;
    }

    pub fn enable_highlights(&mut self) {
        self.highlights_enabled = true;
    }

    pub fn promote(&mut self, item: ItemId) {
        if !self.promoted.contains(&item) {
            self.promoted.push(item);
        }
    }

    pub fn exclude(&mut self, item: ItemId) {
        if !self.excluded.contains(&item) {
            self.excluded.push(item);
        }
    }
}

/// Toggles `selected` inside `current`: removed when present, appended otherwise.
pub fn toggle_value(selected: &str, current: &[String]) -> Vec<String> {
    if current.iter().any(|value| value == selected) {
        current
            .iter()
            .filter(|value| value.as_str() != selected)
            .cloned()
            .collect()
    } else {
        let mut next = current.to_vec();
        next.push(selected.to_string());
        next
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
