//! Persistence
//!
//! Durable ticker counters, paper positions and trade history in a JSON
//! state file, plus an append-only alert journal.

mod journal;
mod store;
mod types;

pub use journal::AlertJournal;
pub use store::StateStore;
pub use types::{JournalEntry, PersistedState, PersistenceError, STATE_VERSION};
