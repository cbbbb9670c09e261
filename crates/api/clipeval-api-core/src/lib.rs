//! clipeval-api-core: property values and destination paths (engine-agnostic)

pub mod typed_path;
pub mod value;

pub use typed_path::{PathError, TypedPath};
pub use value::{Value, ValueKind};
