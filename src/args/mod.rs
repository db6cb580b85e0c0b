pub mod bind;
pub mod descriptor;
pub mod value;

pub use bind::{bind, ArgCursor, BindOutcome};
pub use descriptor::{ArgDescriptor, ArgKind, ArgMarker};
pub use value::{ArgData, ArgValue, ArgValues};
