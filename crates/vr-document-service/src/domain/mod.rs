//! # Domain Layer
//!
//! Pure domain logic: entities, value objects, validation and errors.
//! Nothing in here performs I/O.

pub mod entities;
pub mod errors;
pub mod validation;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use validation::*;
pub use value_objects::*;
