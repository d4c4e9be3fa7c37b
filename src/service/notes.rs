//! Note lifecycle.
//!
//! A stored note is either active or trashed; a destroyed note is simply
//! absent. Every operation is scoped to the calling principal:
//!
//! | From            | Event           | To        | Expiry                          |
//! |-----------------|-----------------|-----------|---------------------------------|
//! | -               | create          | active    | `now + LONG_RETENTION`          |
//! | active, trashed | edit            | unchanged | unchanged                       |
//! | active, trashed | trash           | trashed   | `now + TRASH_RETENTION`         |
//! | trashed         | restore         | active    | `created_on + LONG_RETENTION`   |
//! | active, trashed | delete          | destroyed | -                               |
//! | any             | reaper sweep    | destroyed | once `now >= expire_at`         |
//!
//! Existence is checked before ownership, so an unknown id is `NotFound` for
//! every caller and a foreign note is `Forbidden`.
//!
//! Mutations are read-modify-write without a version check. Two concurrent
//! edits of the same note race and the last write wins.

use std::sync::Arc;

use chrono::{DateTime, Days, Months, SubsecRound, Utc};
use uuid::Uuid;

use crate::auth::Principal;
use crate::clock::Clock;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::*;

/// How long a trashed note is kept before the reaper removes it.
pub const TRASH_RETENTION: Days = Days::new(30);

/// Expiry horizon for active notes, counted from their creation.
pub const LONG_RETENTION: Months = Months::new(60 * 12);

/// Deadline for a note trashed at `now`.
pub fn trash_deadline(now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    now.checked_add_days(TRASH_RETENTION)
        .ok_or_else(|| Error::Internal(anyhow::anyhow!("trash deadline out of range")))
}

/// Deadline for an active note created at `created_on`.
pub fn retention_ceiling(created_on: DateTime<Utc>) -> Result<DateTime<Utc>> {
    created_on
        .checked_add_months(LONG_RETENTION)
        .ok_or_else(|| Error::Internal(anyhow::anyhow!("retention ceiling out of range")))
}

#[derive(Clone)]
pub struct NoteService {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl NoteService {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Current instant at the precision the store keeps.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }

    pub fn add_note(&self, principal: &Principal, input: CreateNoteInput) -> Result<Note> {
        validate_text("title", &input.title)?;
        validate_text("description", &input.description)?;

        let mut color = NoteColor::default();
        if let Some(patch) = input.color {
            validate_color_patch(&patch)?;
            color.background = patch.background.unwrap_or(color.background);
            color.foreground = patch.foreground.unwrap_or(color.foreground);
        }

        let now = self.now();
        let note = Note {
            id: Uuid::new_v4(),
            owner_id: principal.id,
            title: input.title,
            description: input.description,
            tag: normalize_tag(input.tag),
            created_on: now,
            color,
            trashed: false,
            expire_at: Some(retention_ceiling(now)?),
        };

        self.db.create_note(&note)?;
        tracing::info!("Note {} created by {}", note.id, principal.id);
        Ok(note)
    }

    /// Active notes of the caller, newest first.
    pub fn list_notes(&self, principal: &Principal) -> Result<Vec<Note>> {
        Ok(self.db.get_notes_by_owner(principal.id, false)?)
    }

    /// Trashed notes of the caller.
    pub fn list_trash(&self, principal: &Principal) -> Result<Vec<Note>> {
        Ok(self.db.get_notes_by_owner(principal.id, true)?)
    }

    /// Merge a sparse patch into a note. Trashed notes can be edited too;
    /// neither the trashed flag nor the expiry changes.
    pub fn update_note(&self, principal: &Principal, id: Uuid, patch: NotePatch) -> Result<Note> {
        let mut note = self.owned_note(principal, id)?;

        if patch.is_empty() {
            return Err(Error::validation(
                "at least one of title, description, tag or color is required",
            ));
        }
        if let Some(title) = &patch.title {
            validate_text("title", title)?;
        }
        if let Some(description) = &patch.description {
            validate_text("description", description)?;
        }
        if let Some(color) = &patch.color {
            validate_color_patch(color)?;
        }

        let mut patch = patch;
        patch.tag = patch.tag.map(normalize_tag);
        note.apply(patch);

        self.write_back(&note)?;
        tracing::debug!("Note {} updated", id);
        Ok(note)
    }

    /// Move a note to the trash. Trashing an already trashed note re-arms its
    /// deadline.
    pub fn trash_note(&self, principal: &Principal, id: Uuid) -> Result<Note> {
        let mut note = self.owned_note(principal, id)?;

        note.trashed = true;
        note.expire_at = Some(trash_deadline(self.now())?);

        self.write_back(&note)?;
        tracing::info!("Note {} moved to trash", id);
        Ok(note)
    }

    /// Bring a trashed note back. Restoring an active note changes nothing.
    pub fn restore_note(&self, principal: &Principal, id: Uuid) -> Result<Note> {
        let mut note = self.owned_note(principal, id)?;

        if note.state() == NoteState::Active {
            return Ok(note);
        }

        note.trashed = false;
        note.expire_at = Some(retention_ceiling(note.created_on)?);

        self.write_back(&note)?;
        tracing::info!("Note {} restored", id);
        Ok(note)
    }

    /// Remove a note immediately, whatever its state or deadline.
    pub fn delete_note(&self, principal: &Principal, id: Uuid) -> Result<()> {
        self.owned_note(principal, id)?;

        if !self.db.delete_note(id)? {
            return Err(Error::NotFound);
        }
        tracing::info!("Note {} deleted", id);
        Ok(())
    }

    fn owned_note(&self, principal: &Principal, id: Uuid) -> Result<Note> {
        let note = self.db.get_note(id)?.ok_or(Error::NotFound)?;
        if note.owner_id != principal.id {
            tracing::warn!("User {} denied access to note {}", principal.id, id);
            return Err(Error::Forbidden);
        }
        Ok(note)
    }

    fn write_back(&self, note: &Note) -> Result<()> {
        // The row can vanish between read and write if the reaper or a
        // concurrent delete got there first.
        if !self.db.update_note(note)? {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}

fn validate_text(field: &str, value: &str) -> Result<()> {
    if value.trim().chars().count() < MIN_TEXT_LEN {
        return Err(Error::validation(format!(
            "Minimum length of {field} must be {MIN_TEXT_LEN}"
        )));
    }
    Ok(())
}

fn validate_color_patch(patch: &ColorPatch) -> Result<()> {
    for value in [&patch.background, &patch.foreground].into_iter().flatten() {
        if !is_hex_color(value) {
            return Err(Error::validation(format!(
                "Color `{value}` is not a #rrggbb hex value"
            )));
        }
    }
    Ok(())
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// A blank tag is the same as no tag.
fn normalize_tag(tag: Option<String>) -> Option<String> {
    tag.filter(|t| !t.trim().is_empty())
}
