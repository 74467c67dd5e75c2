//! Plain-text rendering shared by the CLI and the MCP tool results

use chrono::{DateTime, SecondsFormat};

use crate::notes::{Note, SystemInfo};

pub fn format_timestamp(epoch_seconds: i64) -> String {
    DateTime::from_timestamp(epoch_seconds, 0)
        .map(|value| value.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| epoch_seconds.to_string())
}

pub fn format_system_info(info: &SystemInfo) -> String {
    format!(
        "App: {}\nVersion: {}\nOS: {}\nArch: {}",
        info.app_name, info.version, info.os, info.arch
    )
}

pub fn format_note(note: &Note) -> String {
    format!(
        "ID: {}\nTitle: {}\nContent: {}\nCreated: {}\nUpdated: {}",
        note.id,
        note.title,
        note.content,
        format_timestamp(note.created_at),
        format_timestamp(note.updated_at)
    )
}

pub fn format_note_list(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "No notes found.".to_string();
    }

    let noun = if notes.len() == 1 { "note" } else { "notes" };
    let body = notes
        .iter()
        .map(format_note)
        .collect::<Vec<_>>()
        .join("\n---\n");
    format!("Found {} {noun}:\n\n{body}", notes.len())
}

pub fn format_note_not_found(id: &str) -> String {
    format!("Note not found: {id}")
}

pub fn format_deleted(id: &str, deleted: bool) -> String {
    if deleted {
        format!("Deleted note {id}")
    } else {
        format_note_not_found(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str) -> Note {
        Note {
            id: id.to_string(),
            title: "Groceries".to_string(),
            content: "milk".to_string(),
            created_at: 1_772_150_400,
            updated_at: 1_772_154_000,
        }
    }

    #[test]
    fn timestamps_render_as_utc() {
        assert_eq!(format_timestamp(1_772_150_400), "2026-02-27T00:00:00Z");
    }

    #[test]
    fn out_of_range_timestamp_falls_back_to_number() {
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn note_lists_all_fields() {
        let text = format_note(&note("n1"));

        assert!(text.contains("ID: n1"));
        assert!(text.contains("Title: Groceries"));
        assert!(text.contains("Content: milk"));
        assert!(text.contains("Updated: 2026-02-27T01:00:00Z"));
    }

    #[test]
    fn empty_list_has_message() {
        assert_eq!(format_note_list(&[]), "No notes found.");
    }

    #[test]
    fn list_counts_and_separates_notes() {
        let text = format_note_list(&[note("n1"), note("n2")]);

        assert!(text.starts_with("Found 2 notes:"));
        assert_eq!(text.matches("\n---\n").count(), 1);
    }

    #[test]
    fn delete_outcome_wording() {
        assert_eq!(format_deleted("n1", true), "Deleted note n1");
        assert_eq!(format_deleted("n1", false), "Note not found: n1");
    }
}
