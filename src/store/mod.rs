mod models;
mod sqlite;

pub use models::{Recording, Session, Transcript};
pub use sqlite::SqliteStore;
