//! Field store, error store and the value types they hold.

mod errors;
mod path;
mod selection;
mod store;
mod value;

pub use errors::ErrorMap;
pub use path::{EntryId, FieldPath};
pub use selection::{Selection, Selections};
pub use store::{Entry, FieldStore, Scope};
pub use value::FieldValue;
