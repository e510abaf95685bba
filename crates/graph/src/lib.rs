//! Identity graph: records linked through shared identifier values.

pub mod store;

pub use store::{analyze, GraphStats, IdentifierCluster, IdentityGraph};
