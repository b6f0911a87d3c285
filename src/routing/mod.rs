//! Routing - history events in, committed routes out
//!
//! route:      Route value, node params, bookmarked-modal query keys
//! history:    History trait + in-memory implementation
//! controller: RoutingController

pub mod controller;
pub mod history;
pub mod route;

pub use controller::{NavigateOptions, RouteOutcome, RouteState, RoutingController};
pub use history::{History, MemoryHistory};
pub use route::{filter_node_params, resolve_link, Route};
