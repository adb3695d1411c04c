#![warn(clippy::pedantic)]
pub mod context;
pub mod documentation;
pub(crate) mod enums_impl;
pub mod errors;
pub mod factory;
pub mod node_kind;
pub mod nodes;
pub(crate) mod nodes_impl;
pub mod postprocessing;
pub mod reader;
