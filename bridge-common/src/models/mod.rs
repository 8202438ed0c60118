//! Domain models

pub mod account;
pub mod demographic;
pub mod label;
pub mod participant;
pub mod password_policy;

pub use account::*;
pub use demographic::*;
pub use label::*;
pub use participant::*;
pub use password_policy::*;
