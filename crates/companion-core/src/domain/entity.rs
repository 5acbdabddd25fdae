//! Domain Layer - Core Entity Trait
//!
//! Every stored record carries a gateway-assigned string identifier.

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// Returns the entity's unique identifier
    fn id(&self) -> &str;
}
