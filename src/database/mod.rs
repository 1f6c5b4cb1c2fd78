//! NoxX database layer.
//!
//! SQLite connection management and schema migrations for the collaborators
//! that persist state: global browsing history and per-site permissions.
//!
//! ```no_run
//! use noxx::database::Database;
//!
//! let db = Database::open("noxx.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
