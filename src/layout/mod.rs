//! Layout: taffy integration and node-style resolution.

pub mod adapter;
pub(crate) mod resolve;

pub use adapter::Region;
pub(crate) use adapter::LayoutAdapter;
