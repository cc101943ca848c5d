pub mod property;

pub use property::{CanonicalField, PropertyRecord};
