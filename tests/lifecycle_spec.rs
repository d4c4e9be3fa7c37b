use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use cloudnote::auth::Principal;
use cloudnote::clock::ManualClock;
use cloudnote::db::Database;
use cloudnote::models::*;
use cloudnote::reaper;
use cloudnote::service::NoteService;
use cloudnote::Error;
use speculate2::speculate;
use uuid::Uuid;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 15, 10, 0, 0).unwrap()
}

fn note_input(title: &str, description: &str) -> CreateNoteInput {
    CreateNoteInput {
        title: title.to_string(),
        description: description.to_string(),
        ..Default::default()
    }
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
        let clock = Arc::new(ManualClock::new(start()));
        let notes = NoteService::new(db.clone(), clock.clone());
        let alice = Principal { id: Uuid::new_v4() };
        let bob = Principal { id: Uuid::new_v4() };
    }

    describe "creating notes" {
        it "starts active with defaults and a long deadline" {
            let note = notes
                .add_note(&alice, note_input("Shopping", "milk, eggs, bread"))
                .expect("Failed to add note");

            assert_eq!(note.owner_id, alice.id);
            assert!(!note.trashed);
            assert_eq!(note.tag, None);
            assert_eq!(note.color, NoteColor::default());
            assert_eq!(note.created_on, start());
            assert_eq!(
                note.expire_at,
                Some(Utc.with_ymd_and_hms(2084, 2, 15, 10, 0, 0).unwrap())
            );
        }

        it "rejects a short title and stores nothing" {
            let result = notes.add_note(&alice, note_input("ab", "long enough"));

            assert!(matches!(result, Err(Error::Validation(_))));
            assert!(notes.list_notes(&alice).unwrap().is_empty());
        }

        it "rejects a malformed color" {
            let mut input = note_input("Shopping", "milk, eggs");
            input.color = Some(ColorPatch {
                background: Some("red".to_string()),
                foreground: None,
            });

            assert!(matches!(notes.add_note(&alice, input), Err(Error::Validation(_))));
        }
    }

    describe "listings" {
        it "keeps active and trashed notes apart" {
            let keep = notes.add_note(&alice, note_input("Keep me", "stays")).unwrap();
            let bin = notes.add_note(&alice, note_input("Bin me", "goes")).unwrap();
            notes.trash_note(&alice, bin.id).unwrap();

            let active: Vec<Uuid> = notes.list_notes(&alice).unwrap().iter().map(|n| n.id).collect();
            let trash: Vec<Uuid> = notes.list_trash(&alice).unwrap().iter().map(|n| n.id).collect();

            assert_eq!(active, vec![keep.id]);
            assert_eq!(trash, vec![bin.id]);
        }

        it "never shows another user's notes" {
            notes.add_note(&alice, note_input("Private", "alice only")).unwrap();

            assert!(notes.list_notes(&bob).unwrap().is_empty());
            assert!(notes.list_trash(&bob).unwrap().is_empty());
        }
    }

    describe "trash and restore" {
        it "sets the deadline thirty days after trashing" {
            let note = notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();
            clock.advance(Duration::hours(5));

            let trashed = notes.trash_note(&alice, note.id).unwrap();

            assert!(trashed.trashed);
            assert_eq!(
                trashed.expire_at,
                Some(Utc.with_ymd_and_hms(2024, 3, 16, 15, 0, 0).unwrap())
            );
        }

        it "re-arms the deadline when trashed again" {
            let note = notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();
            notes.trash_note(&alice, note.id).unwrap();
            clock.advance(Duration::days(10));

            let again = notes.trash_note(&alice, note.id).unwrap();

            assert_eq!(again.expire_at, Some(start() + Duration::days(40)));
        }

        it "restores content and recomputes the deadline from creation" {
            let mut input = note_input("Shopping", "milk, eggs");
            input.tag = Some("home".to_string());
            let note = notes.add_note(&alice, input).unwrap();
            notes.trash_note(&alice, note.id).unwrap();
            clock.advance(Duration::days(3));

            let restored = notes.restore_note(&alice, note.id).unwrap();

            assert!(!restored.trashed);
            assert_eq!(restored.expire_at, note.expire_at);
            assert_eq!(restored.title, note.title);
            assert_eq!(restored.description, note.description);
            assert_eq!(restored.tag, note.tag);
            assert_eq!(restored.created_on, note.created_on);
            assert_eq!(notes.list_notes(&alice).unwrap().len(), 1);
            assert!(notes.list_trash(&alice).unwrap().is_empty());
        }

        it "leaves an active note alone on restore" {
            let note = notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();

            let restored = notes.restore_note(&alice, note.id).unwrap();

            assert_eq!(restored, note);
        }
    }

    describe "expiry" {
        it "keeps a trashed note until its deadline and removes it after" {
            let note = notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();
            let trashed = notes.trash_note(&alice, note.id).unwrap();

            clock.set(trashed.expire_at.unwrap() - Duration::seconds(1));
            assert_eq!(reaper::sweep(&db, clock.as_ref()).unwrap(), 0);
            assert_eq!(notes.list_trash(&alice).unwrap().len(), 1);

            clock.set(trashed.expire_at.unwrap());
            assert_eq!(reaper::sweep(&db, clock.as_ref()).unwrap(), 1);
            assert!(notes.list_trash(&alice).unwrap().is_empty());
            assert!(matches!(
                notes.restore_note(&alice, note.id),
                Err(Error::NotFound)
            ));
        }

        it "does not touch active notes on a normal sweep" {
            notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();
            clock.advance(Duration::days(365));

            assert_eq!(reaper::sweep(&db, clock.as_ref()).unwrap(), 0);
            assert_eq!(notes.list_notes(&alice).unwrap().len(), 1);
        }
    }

    describe "updating" {
        it "changes only the fields present in the patch" {
            let note = notes.add_note(&alice, note_input("Shopping", "milk, eggs")).unwrap();
            let patch = NotePatch {
                tag: Some(Some("home".to_string())),
                ..Default::default()
            };

            let updated = notes.update_note(&alice, note.id, patch).unwrap();

            assert_eq!(updated.tag.as_deref(), Some("home"));
            assert_eq!(updated.title, note.title);
            assert_eq!(updated.description, note.description);
            assert_eq!(updated.color, note.color);
            assert_eq!(notes.list_notes(&alice).unwrap()[0], updated);
        }

        it "clears the tag when it is explicitly null" {
            let mut input = note_input("Shopping", "milk");
            input.tag = Some("home".to_string());
            let note = notes.add_note(&alice, input).unwrap();
            let patch: NotePatch = serde_json::from_str(r#"{"tag": null}"#).unwrap();

            let updated = notes.update_note(&alice, note.id, patch).unwrap();

            assert_eq!(updated.tag, None);
        }

        it "merges one color channel at a time" {
            let note = notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();
            let patch = NotePatch {
                color: Some(ColorPatch {
                    background: Some("#fafafa".to_string()),
                    foreground: None,
                }),
                ..Default::default()
            };

            let updated = notes.update_note(&alice, note.id, patch).unwrap();

            assert_eq!(updated.color.background, "#fafafa");
            assert_eq!(updated.color.foreground, DEFAULT_FOREGROUND);
        }

        it "rejects an empty patch" {
            let note = notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();

            let result = notes.update_note(&alice, note.id, NotePatch::default());

            assert!(matches!(result, Err(Error::Validation(_))));
        }

        it "rejects a short description and keeps the old one" {
            let note = notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();
            let patch = NotePatch {
                description: Some("  a ".to_string()),
                ..Default::default()
            };

            assert!(matches!(
                notes.update_note(&alice, note.id, patch),
                Err(Error::Validation(_))
            ));
            assert_eq!(notes.list_notes(&alice).unwrap()[0].description, "milk");
        }

        it "edits a trashed note without restoring it" {
            let note = notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();
            let trashed = notes.trash_note(&alice, note.id).unwrap();
            let patch = NotePatch {
                title: Some("Groceries".to_string()),
                ..Default::default()
            };

            let updated = notes.update_note(&alice, note.id, patch).unwrap();

            assert_eq!(updated.title, "Groceries");
            assert!(updated.trashed);
            assert_eq!(updated.expire_at, trashed.expire_at);
        }
    }

    describe "deleting" {
        it "removes an active note at once" {
            let note = notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();

            notes.delete_note(&alice, note.id).unwrap();

            assert!(notes.list_notes(&alice).unwrap().is_empty());
            assert!(matches!(notes.delete_note(&alice, note.id), Err(Error::NotFound)));
        }

        it "removes a trashed note before its deadline" {
            let note = notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();
            notes.trash_note(&alice, note.id).unwrap();

            notes.delete_note(&alice, note.id).unwrap();

            assert!(notes.list_trash(&alice).unwrap().is_empty());
        }
    }

    describe "ownership" {
        it "forbids every mutation by another user" {
            let note = notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();
            let patch = NotePatch {
                title: Some("Hijacked".to_string()),
                ..Default::default()
            };

            assert!(matches!(notes.update_note(&bob, note.id, patch), Err(Error::Forbidden)));
            assert!(matches!(notes.trash_note(&bob, note.id), Err(Error::Forbidden)));
            assert!(matches!(notes.restore_note(&bob, note.id), Err(Error::Forbidden)));
            assert!(matches!(notes.delete_note(&bob, note.id), Err(Error::Forbidden)));

            let stored = db.get_note(note.id).unwrap().unwrap();
            assert_eq!(stored, note);
        }

        it "reports an unknown id as not found for anyone" {
            let missing = Uuid::new_v4();

            assert!(matches!(notes.trash_note(&alice, missing), Err(Error::NotFound)));
            assert!(matches!(notes.delete_note(&bob, missing), Err(Error::NotFound)));
        }

        it "reports an update of an unknown id as not found" {
            notes.add_note(&alice, note_input("Shopping", "milk")).unwrap();
            let patch = NotePatch {
                title: Some("Groceries".to_string()),
                ..Default::default()
            };

            let result = notes.update_note(&bob, Uuid::new_v4(), patch);

            assert!(matches!(result, Err(Error::NotFound)));
            assert_eq!(notes.list_notes(&alice).unwrap()[0].title, "Shopping");
        }
    }
}
