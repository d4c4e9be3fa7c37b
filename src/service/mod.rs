//! Use-case services sitting between the HTTP handlers and the store.
//!
//! - [`NoteService`]: the note lifecycle, scoped to the calling principal.
//! - [`AccountService`]: registration, login and profile lookup.

mod accounts;
mod notes;

pub use accounts::*;
pub use notes::*;
