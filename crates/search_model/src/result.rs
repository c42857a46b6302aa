use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::ItemId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub highlights: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub n: u64,
    #[serde(default)]
    pub used: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AggregationValue {
    #[serde(default)]
    pub counters: Vec<Counter>,
    #[serde(default)]
    pub active_elements: Vec<String>,
    #[serde(default)]
    pub total: u64,
}

impl AggregationValue {
    pub fn used_counters(&self) -> impl Iterator<Item = &Counter> {
        self.counters.iter().filter(|counter| counter.used)
    }

    pub fn unused_counters(&self) -> impl Iterator<Item = &Counter> {
        self.counters.iter().filter(|counter| !counter.used)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResultMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub took_ms: Option<u64>,
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Outcome of running one `QueryValue` against the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResultValue {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub aggregations: BTreeMap<String, AggregationValue>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub total_hits: u64,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub metadata: ResultMetadata,
}

impl ResultValue {
    pub fn aggregation(&self, name: &str) -> Option<&AggregationValue> {
        self.aggregations.get(name)
    }

    pub fn first_suggestion(&self) -> Option<&str> {
        self.suggestions.first().map(String::as_str)
    }
}
