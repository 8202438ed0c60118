//! Persistence failure handling and the account lookup collaborator

pub mod converter;
pub mod failure;
pub mod lookup;

pub use converter::*;
pub use failure::*;
pub use lookup::*;
