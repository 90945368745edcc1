//! Request handlers for the gateway's JSON API.

mod blob;
mod container;

pub use blob::*;
pub use container::*;

/// Treats absent and empty parameters alike.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
