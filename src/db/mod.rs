mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::*;

const NOTE_COLUMNS: &str = "id, owner_id, title, description, tag, created_on, \
     color_background, color_foreground, trashed, expire_at";

const USER_COLUMNS: &str = "id, name, email, password_hash, occupation, branch, created_at";

/// SQLite-backed store for users and notes.
///
/// One connection is opened at startup and shared behind a mutex; each call
/// holds the lock for a single statement. Timestamps are stored as fixed-width
/// RFC 3339 UTC strings so that text order matches time order, which the
/// expiry sweep and the listing order rely on.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "cloudnote")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("cloudnote.db"))
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // User operations
    // ============================================================

    /// Insert a user. Returns `false` if the email is already registered.
    pub fn create_user(&self, user: &User) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let result = conn.execute(
            "INSERT INTO users (id, name, email, password_hash, occupation, branch, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                user.id.to_string(),
                &user.name,
                &user.email,
                &user.password_hash,
                &user.occupation,
                &user.branch,
                format_datetime(user.created_at),
            ),
        );

        match result {
            Ok(_) => Ok(true),
            // `email` carries the only UNIQUE index on users; a duplicate id
            // is a PRIMARYKEY violation and surfaces as an error.
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
                    && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                [id.to_string()],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"),
                [email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    // ============================================================
    // Note operations
    // ============================================================

    pub fn create_note(&self, note: &Note) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            &format!("INSERT INTO notes ({NOTE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            (
                note.id.to_string(),
                note.owner_id.to_string(),
                &note.title,
                &note.description,
                &note.tag,
                format_datetime(note.created_on),
                &note.color.background,
                &note.color.foreground,
                note.trashed,
                note.expire_at.map(format_datetime),
            ),
        )?;
        Ok(())
    }

    pub fn get_note(&self, id: Uuid) -> Result<Option<Note>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let note = conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"),
                [id.to_string()],
                note_from_row,
            )
            .optional()?;
        Ok(note)
    }

    /// Notes of one owner in one state.
    ///
    /// Active notes come newest first. Trashed notes come in the order they
    /// will be reaped.
    pub fn get_notes_by_owner(&self, owner_id: Uuid, trashed: bool) -> Result<Vec<Note>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let order = if trashed {
            "expire_at ASC"
        } else {
            "created_on DESC"
        };
        let mut stmt = conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE owner_id = ? AND trashed = ? ORDER BY {order}"
        ))?;

        let notes = stmt
            .query_map((owner_id.to_string(), trashed), note_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    /// Write back the mutable fields of a note. Owner and creation instant
    /// are never rewritten.
    pub fn update_note(&self, note: &Note) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "UPDATE notes SET title = ?, description = ?, tag = ?, color_background = ?,
                color_foreground = ?, trashed = ?, expire_at = ?
             WHERE id = ?",
            (
                &note.title,
                &note.description,
                &note.tag,
                &note.color.background,
                &note.color.foreground,
                note.trashed,
                note.expire_at.map(format_datetime),
                note.id.to_string(),
            ),
        )?;
        Ok(rows > 0)
    }

    pub fn delete_note(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM notes WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    /// Remove every note whose expiry instant is at or before `now`.
    pub fn delete_expired_notes(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "DELETE FROM notes WHERE expire_at IS NOT NULL AND expire_at <= ?",
            [format_datetime(now)],
        )?;
        Ok(rows)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: parse_uuid(row, 0)?,
        owner_id: parse_uuid(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        tag: row.get(4)?,
        created_on: parse_datetime(row, 5)?,
        color: NoteColor {
            background: row.get(6)?,
            foreground: row.get(7)?,
        },
        trashed: row.get(8)?,
        expire_at: match row.get::<_, Option<String>>(9)? {
            Some(_) => Some(parse_datetime(row, 9)?),
            None => None,
        },
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(row, 0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        occupation: row.get(4)?,
        branch: row.get(5)?,
        created_at: parse_datetime(row, 6)?,
    })
}

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 9).unwrap();
        let later = earlier + chrono::Duration::milliseconds(1500);

        assert!(format_datetime(earlier) < format_datetime(later));
        assert_eq!(format_datetime(earlier).len(), format_datetime(later).len());
    }
}
