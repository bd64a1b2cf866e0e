//! Work selector — derives the pending-translation set from a level's
//! records.
//!
//! Selection is pure and deterministic: identical record state always yields
//! the identical ordered item list. The sentinel predicate (empty or
//! identical-to-source) is the sole source of truth for pending status; no
//! flags are persisted.

use percent_encoding::percent_decode_str;

use wortschatz_shared::LexicalRecord;

// ---------------------------------------------------------------------------
// Work items
// ---------------------------------------------------------------------------

/// Which translatable field of a record a work item points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// The record's primary translation (`english`).
    Primary,
    /// The translation of `synonyms[i]`.
    Synonym(usize),
    /// The translation of `examples[i]`.
    Example(usize),
}

/// A reference to exactly one translatable field inside exactly one record.
/// Created transiently each run; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    pub record: usize,
    pub field: FieldKind,
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// All pending (item, source text) pairs, in record order and within a
/// record in field order: primary, synonyms, examples.
pub fn pending_items(records: &[LexicalRecord]) -> Vec<(WorkItem, String)> {
    pending_items_from(records, 0)
}

/// Pending items for records at or after `start_record`. Resume uses this to
/// skip the checkpointed prefix without re-scanning it.
pub fn pending_items_from(
    records: &[LexicalRecord],
    start_record: usize,
) -> Vec<(WorkItem, String)> {
    let mut items = Vec::new();

    for (idx, record) in records.iter().enumerate().skip(start_record) {
        if primary_pending(record) {
            let source = decoded_word(record);
            if !source.is_empty() {
                items.push((
                    WorkItem {
                        record: idx,
                        field: FieldKind::Primary,
                    },
                    source,
                ));
            }
        }

        for (i, synonym) in record.synonyms.iter().enumerate() {
            if synonym.needs_translation() && !synonym.german.is_empty() {
                items.push((
                    WorkItem {
                        record: idx,
                        field: FieldKind::Synonym(i),
                    },
                    synonym.german.clone(),
                ));
            }
        }

        for (i, example) in record.examples.iter().enumerate() {
            if example.needs_translation() && !example.german.is_empty() {
                items.push((
                    WorkItem {
                        record: idx,
                        field: FieldKind::Example(i),
                    },
                    example.german.clone(),
                ));
            }
        }
    }

    items
}

/// Sentinel predicate for the primary field. The stored word may carry
/// URL-style escaping, so the comparison also runs against the decoded form —
/// a raw vs. decoded mismatch must not be mistaken for "already translated".
pub fn primary_pending(record: &LexicalRecord) -> bool {
    record.english.is_empty()
        || record.english == record.word
        || record.english == decoded_word(record)
}

/// Apply a translation result back to the field a work item references.
/// Out-of-range items (never produced by selection) are ignored rather than
/// panicking.
pub fn apply(records: &mut [LexicalRecord], item: WorkItem, translated: String) {
    let Some(record) = records.get_mut(item.record) else {
        return;
    };

    match item.field {
        FieldKind::Primary => record.english = translated,
        FieldKind::Synonym(i) => {
            if let Some(pair) = record.synonyms.get_mut(i) {
                pair.english = translated;
            }
        }
        FieldKind::Example(i) => {
            if let Some(pair) = record.examples.get_mut(i) {
                pair.english = translated;
            }
        }
    }
}

fn decoded_word(record: &LexicalRecord) -> String {
    percent_decode_str(&record.word)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wortschatz_shared::TextPair;

    fn record(word: &str, english: &str) -> LexicalRecord {
        let mut r = LexicalRecord::new(word);
        r.english = english.into();
        r
    }

    #[test]
    fn selects_in_record_and_field_order() {
        let mut first = record("Haus", "Haus");
        first.synonyms.push(TextPair::untranslated("Gebäude"));
        first.examples.push(TextPair::untranslated("Das Haus steht."));
        let second = record("Baum", "");
        let done = record("Wald", "forest");

        let items = pending_items(&[first, second, done]);
        let fields: Vec<(usize, FieldKind)> =
            items.iter().map(|(item, _)| (item.record, item.field)).collect();

        assert_eq!(
            fields,
            vec![
                (0, FieldKind::Primary),
                (0, FieldKind::Synonym(0)),
                (0, FieldKind::Example(0)),
                (1, FieldKind::Primary),
            ]
        );
        assert_eq!(items[2].1, "Das Haus steht.");
    }

    #[test]
    fn selection_is_deterministic() {
        let records = vec![record("Haus", "Haus"), record("Baum", "tree")];
        assert_eq!(pending_items(&records), pending_items(&records));
    }

    #[test]
    fn encoded_word_is_not_mistaken_for_translated() {
        // Stored word is escaped; english holds the decoded form. That is an
        // echo of the source, not a translation.
        let r = record("%C3%84nderung", "Änderung");
        assert!(primary_pending(&r));

        let items = pending_items(&[r]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].1, "Änderung");
    }

    #[test]
    fn translated_primary_is_not_selected() {
        let r = record("Änderung", "change");
        assert!(!primary_pending(&r));
        assert!(pending_items(&[r]).is_empty());
    }

    #[test]
    fn empty_source_sub_entries_are_skipped() {
        let mut r = record("Haus", "house");
        r.synonyms.push(TextPair {
            german: String::new(),
            english: String::new(),
        });
        assert!(pending_items(&[r]).is_empty());
    }

    #[test]
    fn start_record_skips_the_prefix() {
        let records = vec![record("Haus", ""), record("Baum", ""), record("Wald", "")];
        let items = pending_items_from(&records, 1);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].0.record, 1);
    }

    #[test]
    fn apply_writes_the_referenced_field_only() {
        let mut records = vec![record("Haus", "Haus")];
        records[0].examples.push(TextPair::untranslated("Ein Haus."));

        apply(
            &mut records,
            WorkItem {
                record: 0,
                field: FieldKind::Example(0),
            },
            "A house.".into(),
        );

        assert_eq!(records[0].examples[0].english, "A house.");
        assert_eq!(records[0].english, "Haus");

        // Out-of-range application is ignored.
        apply(
            &mut records,
            WorkItem {
                record: 7,
                field: FieldKind::Primary,
            },
            "ghost".into(),
        );
    }
}
