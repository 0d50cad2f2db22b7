//! Spatial and attribute queries over the loaded feature stores.

pub mod attribute;
pub mod result;
pub mod spatial;

pub use attribute::{AttributeOperator, AttributeQuery, AttributeResults};
pub use result::{LayerHits, QueryHit, QueryResult};
pub use spatial::SpatialQuery;
