//! Meridian Core
//!
//! Dependency resolution and configuration synthesis engine: turns a raw
//! resource identifier, an API request body, and a growing configuration
//! document into a fully wired, conflict-free set of declarative blocks.

pub mod armid;
pub mod context;
pub mod definition;
pub mod document;
pub mod pattern;
pub mod reference;
pub mod resolver;
pub mod value;
