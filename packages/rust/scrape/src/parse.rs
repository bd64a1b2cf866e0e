//! HTML extraction for DWDS word pages.
//!
//! Each extractor targets one section of the page and returns an empty value
//! when the section is absent — a sparse page is normal, not an error.

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use wortschatz_shared::ScrapeConfig;

use crate::DwdsEntry;

/// Etymology text is truncated to this many characters.
const ETYMOLOGY_MAX_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// ParseLimits
// ---------------------------------------------------------------------------

/// Caps on how much of each page section is kept.
#[derive(Debug, Clone, Copy)]
pub struct ParseLimits {
    pub max_examples: usize,
    pub max_compounds: usize,
    pub max_related: usize,
}

impl From<&ScrapeConfig> for ParseLimits {
    fn from(config: &ScrapeConfig) -> Self {
        Self {
            max_examples: config.max_examples,
            max_compounds: config.max_compounds,
            max_related: config.max_synonyms,
        }
    }
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self::from(&ScrapeConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Entry extraction
// ---------------------------------------------------------------------------

/// Parse one word page into its structured fields.
pub fn parse_entry(html: &str, lemma: &str, limits: &ParseLimits) -> DwdsEntry {
    let doc = Html::parse_document(html);

    DwdsEntry {
        frequency: extract_frequency(&doc),
        etymology: extract_etymology(&doc),
        examples: extract_examples(&doc, limits.max_examples),
        compounds: extract_compounds(&doc, lemma, limits.max_compounds),
        related_words: extract_related_words(&doc, lemma, limits.max_related),
        composition: extract_composition(&doc),
    }
}

/// Frequency is rendered as a row of dots; count the active ones.
fn extract_frequency(doc: &Html) -> Option<String> {
    let table_sel = Selector::parse("table.word-frequency").unwrap();
    let dot_sel = Selector::parse(r#"div[class*="word-frequency"]"#).unwrap();
    let active_sel = Selector::parse("div.word-frequency-active").unwrap();

    let table = doc.select(&table_sel).next()?;
    let total = table.select(&dot_sel).count();
    if total == 0 {
        return None;
    }
    let active = table.select(&active_sel).count();
    Some(format!("{active} out of {total}"))
}

/// Etymology section, gated on its header so stray `etymwb-entry` markup
/// elsewhere is not picked up.
fn extract_etymology(doc: &Html) -> Option<String> {
    let header_sel = Selector::parse(r#"h2[id^="etymwb"]"#).unwrap();
    let entry_sel = Selector::parse("div.etymwb-wrapper div.etymwb-entry").unwrap();

    doc.select(&header_sel).next()?;
    let entry = doc.select(&entry_sel).next()?;

    let text = collapse_whitespace(&entry.text().collect::<Vec<_>>().join(" "));
    if text.is_empty() {
        return None;
    }

    if text.chars().count() > ETYMOLOGY_MAX_CHARS {
        let truncated: String = text.chars().take(ETYMOLOGY_MAX_CHARS).collect();
        Some(format!("{truncated}..."))
    } else {
        Some(text)
    }
}

/// Example sentences from both curated and corpus citation blocks. Citation
/// markers are stripped and bare word fragments (no space) are skipped.
fn extract_examples(doc: &Html, max: usize) -> Vec<String> {
    let text_sel = Selector::parse(
        "div.dwdswb-kompetenzbeispiel span.dwdswb-belegtext, div.dwdswb-beleg span.dwdswb-belegtext",
    )
    .unwrap();
    let citation = Regex::new(r"\[\d+\]").unwrap();

    let mut examples = Vec::new();
    for el in doc.select(&text_sel) {
        if examples.len() >= max {
            break;
        }

        let raw = el.text().collect::<Vec<_>>().join(" ");
        let cleaned = collapse_whitespace(&citation.replace_all(&raw, ""));
        if cleaned.len() > 5 && cleaned.contains(' ') {
            examples.push(cleaned);
        }
    }

    examples
}

/// Compound words from the Wortbildung block.
fn extract_compounds(doc: &Html, lemma: &str, max: usize) -> Vec<String> {
    let link_sel = Selector::parse(r#"a[href^="/wb/"]"#).unwrap();

    let Some(blocktext) = find_ft_block(doc, "Wortbildung") else {
        return Vec::new();
    };

    let mut compounds = Vec::new();
    for link in blocktext.select(&link_sel) {
        if compounds.len() >= max {
            break;
        }
        let word = collapse_whitespace(&link.text().collect::<Vec<_>>().join(""));
        if !word.is_empty() && word != lemma {
            compounds.push(word);
        }
    }

    compounds
}

/// Semantically related words from the synset blocks, deduplicated and with
/// the lemma itself excluded.
fn extract_related_words(doc: &Html, lemma: &str, max: usize) -> Vec<String> {
    let header_sel = Selector::parse(r#"h2[id^="ot-"]"#).unwrap();
    let block_sel = Selector::parse("div.ot-synset-block").unwrap();
    let link_sel = Selector::parse(r#"a[href*="/wb/"]"#).unwrap();

    if doc.select(&header_sel).next().is_none() {
        return Vec::new();
    }

    let mut seen = std::collections::HashSet::new();
    let mut related = Vec::new();

    'blocks: for block in doc.select(&block_sel) {
        for link in block.select(&link_sel) {
            if related.len() >= max {
                break 'blocks;
            }
            let word = collapse_whitespace(&link.text().collect::<Vec<_>>().join(""));
            if !word.is_empty() && word != lemma && seen.insert(word.clone()) {
                related.push(word);
            }
        }
    }

    related
}

/// Word decomposition from the Wortzerlegung block. Parts appear both as
/// links and as bare text; `<sup>` homonym digits inside links are dropped.
fn extract_composition(doc: &Html) -> Vec<String> {
    let Some(blocktext) = find_ft_block(doc, "Wortzerlegung") else {
        return Vec::new();
    };

    let mut parts = Vec::new();
    for child in blocktext.children() {
        match child.value() {
            Node::Text(text) => {
                let part = text.trim();
                if !part.is_empty() {
                    parts.push(part.to_string());
                }
            }
            Node::Element(el) if el.name() == "a" => {
                if let Some(link) = ElementRef::wrap(child) {
                    let part = collapse_whitespace(&text_without_sup(link));
                    if !part.is_empty() {
                        parts.push(part);
                    }
                }
            }
            _ => {}
        }
    }

    parts
}

/// Find the `dwdswb-ft-blocktext` of the feature block whose label contains
/// `label` ("Wortbildung", "Wortzerlegung", …).
fn find_ft_block<'a>(doc: &'a Html, label: &str) -> Option<ElementRef<'a>> {
    let block_sel = Selector::parse("div.dwdswb-ft-block").unwrap();
    let label_sel = Selector::parse("span.dwdswb-ft-blocklabel").unwrap();
    let text_sel = Selector::parse("span.dwdswb-ft-blocktext").unwrap();

    for block in doc.select(&block_sel) {
        let matches = block
            .select(&label_sel)
            .next()
            .is_some_and(|l| l.text().collect::<String>().contains(label));
        if matches {
            return block.select(&text_sel).next();
        }
    }
    None
}

/// Element text with `<sup>` subtrees excluded.
fn text_without_sup(el: ElementRef) -> String {
    let mut out = String::new();
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) if e.name() != "sup" => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    out.push_str(&text_without_sup(child_el));
                }
            }
            _ => {}
        }
    }
    out
}

/// Collapse runs of whitespace to single spaces and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
      <table class="word-frequency">
        <tr>
          <td><div class="word-frequency-active"></div></td>
          <td><div class="word-frequency-active"></div></td>
          <td><div class="word-frequency-active"></div></td>
          <td><div class="word-frequency-inactive"></div></td>
          <td><div class="word-frequency-inactive"></div></td>
        </tr>
      </table>

      <h2 id="etymwb-1">Etymologie</h2>
      <div class="etymwb-wrapper">
        <div class="etymwb-entry">Haus n. ahd. hūs, asächs. hūs, got. gudhūs</div>
      </div>

      <div class="dwdswb-kompetenzbeispiel">
        <span class="dwdswb-belegtext">das Haus <span class="dwdswb-stichwort">steht</span>
          am Hang [12]</span>
      </div>
      <div class="dwdswb-beleg">
        <span class="dwdswb-belegtext">Haus</span>
      </div>
      <div class="dwdswb-beleg">
        <span class="dwdswb-belegtext">Wir bauen ein Haus.</span>
      </div>

      <div class="dwdswb-ft-block">
        <span class="dwdswb-ft-blocklabel">Wortbildung</span>
        <span class="dwdswb-ft-blocktext">
          <a href="/wb/Hausarbeit">Hausarbeit</a> ·
          <a href="/wb/Haus">Haus</a> ·
          <a href="/wb/Haustür">Haustür</a>
        </span>
      </div>

      <div class="dwdswb-ft-block">
        <span class="dwdswb-ft-blocklabel">Wortzerlegung</span>
        <span class="dwdswb-ft-blocktext"><a href="/wb/ver-">ver-</a><a href="/wb/stehen">stehen<sup>1</sup></a> + Rest</span>
      </div>

      <h2 id="ot-1">Bedeutungsverwandte Ausdrücke</h2>
      <div class="ot-synset-block">
        <a href="/wb/Gebäude">Gebäude</a>
        <a href="/wb/Heim">Heim</a>
        <a href="/wb/Gebäude">Gebäude</a>
        <a href="/wb/Haus">Haus</a>
      </div>
    </body></html>"#;

    #[test]
    fn extracts_frequency_dots() {
        let entry = parse_entry(PAGE, "Haus", &ParseLimits::default());
        assert_eq!(entry.frequency.as_deref(), Some("3 out of 5"));
    }

    #[test]
    fn extracts_etymology() {
        let entry = parse_entry(PAGE, "Haus", &ParseLimits::default());
        let etymology = entry.etymology.expect("etymology");
        assert!(etymology.starts_with("Haus n. ahd."));
    }

    #[test]
    fn truncates_long_etymology() {
        let long_text = "wort ".repeat(200);
        let html = format!(
            r#"<h2 id="etymwb-1">E</h2><div class="etymwb-wrapper"><div class="etymwb-entry">{long_text}</div></div>"#
        );
        let entry = parse_entry(&html, "Wort", &ParseLimits::default());
        let etymology = entry.etymology.expect("etymology");
        assert!(etymology.ends_with("..."));
        assert_eq!(etymology.chars().count(), ETYMOLOGY_MAX_CHARS + 3);
    }

    #[test]
    fn examples_skip_fragments_and_strip_citations() {
        let entry = parse_entry(PAGE, "Haus", &ParseLimits::default());
        assert_eq!(
            entry.examples,
            vec!["das Haus steht am Hang", "Wir bauen ein Haus."]
        );
    }

    #[test]
    fn compounds_exclude_the_lemma() {
        let entry = parse_entry(PAGE, "Haus", &ParseLimits::default());
        assert_eq!(entry.compounds, vec!["Hausarbeit", "Haustür"]);
    }

    #[test]
    fn related_words_dedupe_and_exclude_lemma() {
        let entry = parse_entry(PAGE, "Haus", &ParseLimits::default());
        assert_eq!(entry.related_words, vec!["Gebäude", "Heim"]);
    }

    #[test]
    fn related_words_respect_cap() {
        let limits = ParseLimits {
            max_related: 1,
            ..ParseLimits::default()
        };
        let entry = parse_entry(PAGE, "Haus", &limits);
        assert_eq!(entry.related_words, vec!["Gebäude"]);
    }

    #[test]
    fn composition_mixes_links_and_text_and_strips_sup() {
        let entry = parse_entry(PAGE, "Haus", &ParseLimits::default());
        assert_eq!(entry.composition, vec!["ver-", "stehen", "+ Rest"]);
    }

    #[test]
    fn sparse_page_yields_default_entry() {
        let entry = parse_entry("<html><body></body></html>", "Haus", &ParseLimits::default());
        assert_eq!(entry, DwdsEntry::default());
    }
}
