//! Domain model: records served by the API and figures derived from them
pub mod aggregates;
pub mod events;
pub mod value_objects;
