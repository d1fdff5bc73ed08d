use serde::Serialize;
use tracing::warn;

/// Which source table a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Countries,
    Transcontinental,
    Dependent,
    Disputed,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Section::Countries => "countries",
            Section::Transcontinental => "transcontinental",
            Section::Dependent => "dependent",
            Section::Disputed => "disputed",
        }
    }
}

// Section headings as they appear in the article, in declaration order.
// This order is also the processing order of the downstream pipeline.
const SECTION_HEADINGS: &[(Section, &str)] = &[
    (Section::Countries, "=== Countries ==="),
    (
        Section::Transcontinental,
        "=== Transcontinental countries ===",
    ),
    (Section::Dependent, "=== Dependent territories ==="),
    (Section::Disputed, "=== Disputed territories ==="),
];

/// One raw table row, tagged with its source section.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub text: String,
    pub section: Section,
}

/// Locate each known section heading, isolate the wikitable that follows it,
/// and split the table into data rows.
///
/// A missing heading or a table without `{|`/`|}` markers just skips that
/// section; the article's structure drifts and one absent section must not
/// take down the others. The segment before the first `|-` separator holds
/// only header cells and is discarded.
pub fn extract_rows(wikitext: &str) -> Vec<RawRow> {
    let mut rows = Vec::new();

    for &(section, heading) in SECTION_HEADINGS {
        let Some(start) = wikitext.find(heading) else {
            warn!("section '{}' not found in wikitext", heading);
            continue;
        };

        let Some(table_start) = wikitext[start..].find("{|").map(|i| start + i) else {
            warn!("no table after section '{}'", heading);
            continue;
        };
        let Some(table_end) = wikitext[table_start..].find("|}").map(|i| table_start + i)
        else {
            warn!("unterminated table in section '{}'", heading);
            continue;
        };

        let table_text = &wikitext[table_start..table_end];

        for row in table_text.split("\n|-").skip(1) {
            rows.push(RawRow {
                text: row.to_string(),
                section,
            });
        }
    }

    rows
}
