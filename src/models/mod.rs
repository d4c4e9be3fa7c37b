//! Domain models for cloudnote.
//!
//! - [`Note`]: a user's text note. Lives in one of two persisted states
//!   ([`NoteState::Active`] or [`NoteState::Trashed`]) until it is deleted
//!   explicitly or reaped after its expiry deadline.
//! - [`NotePatch`]: sparse update merged field by field into a stored note.
//! - [`User`]: a registered account. Only its id travels inside tokens.

mod note;
mod user;

pub use note::*;
pub use user::*;
