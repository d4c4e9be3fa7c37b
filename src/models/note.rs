use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub const DEFAULT_BACKGROUND: &str = "#ffffff";
pub const DEFAULT_FOREGROUND: &str = "#000000";

/// Minimum length for a note's title and description.
pub const MIN_TEXT_LEN: usize = 3;

/// A text note owned by a single user.
///
/// Notes move between two persisted states, active and trashed. Both carry an
/// expiry deadline: active notes expire far in the future as a cleanup safety
/// net, trashed notes expire after the trash retention window. Once the
/// deadline passes the reaper removes the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    /// The user who created the note. Never changes.
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub tag: Option<String>,
    /// Creation instant. Survives edits and trash/restore cycles unchanged.
    pub created_on: DateTime<Utc>,
    pub color: NoteColor,
    pub trashed: bool,
    pub expire_at: Option<DateTime<Utc>>,
}

impl Note {
    pub fn state(&self) -> NoteState {
        if self.trashed {
            NoteState::Trashed
        } else {
            NoteState::Active
        }
    }

    /// Merge a patch into the note. Only fields present in the patch change.
    pub fn apply(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(tag) = patch.tag {
            self.tag = tag;
        }
        if let Some(color) = patch.color {
            if let Some(background) = color.background {
                self.color.background = background;
            }
            if let Some(foreground) = color.foreground {
                self.color.foreground = foreground;
            }
        }
    }
}

/// Lifecycle state of a persisted note.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteState {
    Active,
    Trashed,
}

/// Display colors, stored as `#rrggbb` hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteColor {
    pub background: String,
    pub foreground: String,
}

impl Default for NoteColor {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND.to_string(),
            foreground: DEFAULT_FOREGROUND.to_string(),
        }
    }
}

/// Input for creating a note.
///
/// `title` and `description` default to empty so that a missing field is
/// reported as a validation error rather than a body parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNoteInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub tag: Option<String>,
    pub color: Option<ColorPatch>,
}

/// Sparse update for a note.
///
/// Absent fields leave the stored value unchanged. For `tag`, an explicit
/// `null` clears the tag while an absent key keeps it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub tag: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorPatch>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tag.is_none()
            && self.color.as_ref().map_or(true, ColorPatch::is_empty)
    }
}

/// Per-component color update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
}

impl ColorPatch {
    pub fn is_empty(&self) -> bool {
        self.background.is_none() && self.foreground.is_none()
    }
}

/// Marks a key as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
