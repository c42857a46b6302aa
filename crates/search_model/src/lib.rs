pub mod domain;
pub mod error;
pub mod query;
pub mod result;

pub use domain::ItemId;
pub use error::ModelError;
pub use query::{
    toggle_value, AggregationRequest, AggregationSort, Filter, FilterApplication, FilterKind,
    QueryValue, SortBy, SortDirection,
};
pub use result::{AggregationValue, Counter, Item, ResultMetadata, ResultValue};
