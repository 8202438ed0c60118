//! Account database: schema initialization and the SQLite account store

pub mod accounts;
pub mod init;

pub use accounts::SqliteAccountStore;
pub use init::*;
