//! German morphology helpers: part-of-speech mapping, affix meanings, and a
//! heuristic word decomposition used when a page carries no Wortzerlegung
//! section.

/// Map a German word-class name to its English part-of-speech tag. Unknown
/// classes pass through lowercased rather than failing.
pub fn map_part_of_speech(word_class: &str) -> String {
    match word_class {
        "Substantiv" => "noun",
        "Verb" => "verb",
        "Adjektiv" => "adjective",
        "Adverb" => "adverb",
        "Konjunktion" => "conjunction",
        "Präposition" => "preposition",
        "Pronomen" => "pronoun",
        "Artikel" => "article",
        "Numerale" => "numeral",
        "Interjektion" => "interjection",
        other => return other.to_lowercase(),
    }
    .to_string()
}

/// Separable and inseparable verb prefixes with their rough meanings.
/// Order matters: the first match wins, so longer prefixes come before their
/// one-letter-shorter cousins where ambiguous.
const PREFIX_MEANINGS: &[(&str, &str)] = &[
    ("ab", "off, away"),
    ("an", "on, to"),
    ("auf", "up, open"),
    ("aus", "out, off"),
    ("ein", "in, into"),
    ("mit", "with, along"),
    ("vor", "before, forward"),
    ("be", "makes transitive"),
    ("ge", "participle / past"),
    ("ent", "remove, away"),
    ("er", "achieve, complete"),
    ("ver", "excess, change"),
    ("zer", "destroy, apart"),
    ("um", "around / derail"),
    ("über", "over / translate"),
    ("unter", "under"),
    ("durch", "through"),
    ("hinter", "behind"),
    ("wider", "against"),
    ("miss", "wrong, bad"),
    ("hin", "toward"),
    ("her", "from"),
    ("zu", "to, closed"),
    ("nach", "after"),
    ("los", "loose, off"),
];

/// Derivational suffixes with their rough meanings.
const SUFFIX_MEANINGS: &[(&str, &str)] = &[
    ("chen", "diminutive"),
    ("lein", "diminutive"),
    ("heit", "abstract noun"),
    ("keit", "abstract noun"),
    ("ling", "person/thing"),
    ("ung", "action/process"),
    ("bar", "capability"),
    ("ig", "quality"),
    ("lich", "characteristic"),
    ("los", "without"),
    ("sam", "tendency"),
    ("weise", "manner"),
    ("isch", "relating to"),
    ("schaft", "collective/state"),
    ("tum", "state/realm"),
    ("nis", "result/state"),
    ("sal", "result"),
    ("haft", "having quality"),
    ("end", "present participle"),
    ("er", "agent/doer"),
    ("or", "agent noun"),
    ("in", "feminine"),
    ("en", "infinitive/plural"),
    ("e", "verb→noun"),
];

/// The meaning of a prefix, if known.
pub fn prefix_meaning(prefix: &str) -> Option<&'static str> {
    PREFIX_MEANINGS
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, m)| *m)
}

/// The meaning of a suffix, if known.
pub fn suffix_meaning(suffix: &str) -> Option<&'static str> {
    SUFFIX_MEANINGS
        .iter()
        .find(|(s, _)| *s == suffix)
        .map(|(_, m)| *m)
}

/// Classify a decomposition part by its hyphen marking: `ver-` is a prefix,
/// `-ung` a suffix, anything else a root word. Unknown affixes echo the
/// affix itself as the meaning.
pub fn classify_part(part: &str) -> String {
    let clean = part.trim_matches('-');
    if part.ends_with('-') {
        format!("prefix: {}", prefix_meaning(clean).unwrap_or(clean))
    } else if part.starts_with('-') {
        format!("suffix: {}", suffix_meaning(clean).unwrap_or(clean))
    } else {
        format!("root word: {part}")
    }
}

/// Heuristic decomposition for words whose page has no Wortzerlegung
/// section: detect a leading prefix, else a trailing suffix. Returns
/// (composition parts, part meanings); both empty when nothing matches.
pub fn heuristic_composition(word: &str) -> (Vec<String>, Vec<String>) {
    for (prefix, meaning) in PREFIX_MEANINGS {
        if let Some(rest) = word.strip_prefix(prefix) {
            if rest.is_empty() {
                continue;
            }
            return (
                vec![format!("{prefix}-"), rest.to_string()],
                vec![format!("prefix: {meaning}"), format!("root word: {rest}")],
            );
        }
    }

    for (suffix, meaning) in SUFFIX_MEANINGS {
        if let Some(rest) = word.strip_suffix(suffix) {
            if rest.is_empty() {
                continue;
            }
            return (
                vec![rest.to_string(), format!("-{suffix}")],
                vec![format!("root word: {rest}"), format!("suffix: {meaning}")],
            );
        }
    }

    (Vec::new(), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_mapping_known_and_unknown() {
        assert_eq!(map_part_of_speech("Substantiv"), "noun");
        assert_eq!(map_part_of_speech("Präposition"), "preposition");
        assert_eq!(map_part_of_speech("Partikel"), "partikel");
    }

    #[test]
    fn classify_marks_affixes_and_roots() {
        assert_eq!(classify_part("ver-"), "prefix: excess, change");
        assert_eq!(classify_part("-ung"), "suffix: action/process");
        assert_eq!(classify_part("Bindung"), "root word: Bindung");
        assert_eq!(classify_part("xyz-"), "prefix: xyz");
    }

    #[test]
    fn heuristic_prefers_prefix_over_suffix() {
        let (parts, meanings) = heuristic_composition("verstehen");
        assert_eq!(parts, vec!["ver-", "stehen"]);
        assert_eq!(
            meanings,
            vec!["prefix: excess, change", "root word: stehen"]
        );
    }

    #[test]
    fn heuristic_falls_back_to_suffix() {
        let (parts, meanings) = heuristic_composition("Freiheit");
        assert_eq!(parts, vec!["Frei", "-heit"]);
        assert_eq!(meanings, vec!["root word: Frei", "suffix: abstract noun"]);
    }

    #[test]
    fn heuristic_handles_no_match_and_bare_affix() {
        assert_eq!(heuristic_composition("Ort"), (vec![], vec![]));
        // The whole word being a prefix is not a decomposition.
        let (parts, _) = heuristic_composition("aus");
        assert!(parts.is_empty());
    }
}
