//! Repository Layer
//!
//! Typed, owner/child-scoped access to the persistence gateway.

mod traits;
mod scope;
mod positioning;


pub use traits::Record;
pub use scope::{ChildScope, OwnerScope};
pub use positioning::{assign_positions, list_move, next_order, position_updates};
