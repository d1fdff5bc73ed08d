//! Wikitext table extraction for the "European vehicle registration plate"
//! article. Not a general wikitext parser: it handles exactly the table
//! shape of that article and is expected to need heuristic updates if the
//! source formatting changes.

pub mod row;
pub mod tables;

use tracing::debug;

use crate::territory;
pub use tables::Section;

/// One normalized catalog entry: a territory and its chosen example-plate
/// image, ready for resolution against the Commons API.
#[derive(Debug, Clone)]
pub struct PlateEntry {
    pub wiki_code: String,
    pub territory_id: String,
    pub display_name: String,
    pub section: Section,
    /// Namespaced Commons file title, e.g. `File:DEU_plate.jpg`.
    pub image_file: String,
}

/// Parse the article wikitext into the ordered list of plate entries.
///
/// Pure function of the input text: entry order follows section declaration
/// order, then row order within each table. Rows without a recognizable code
/// or without a non-strip image produce no entry.
pub fn parse_plate_tables(wikitext: &str) -> Vec<PlateEntry> {
    let mut entries = Vec::new();

    for raw in tables::extract_rows(wikitext) {
        let Some((wiki_code, image_file)) = row::classify(&raw.text) else {
            debug!("skipping non-data row in section '{}'", raw.section.label());
            continue;
        };
        let (territory_id, display_name) = territory::canonicalize(&wiki_code);
        entries.push(PlateEntry {
            wiki_code,
            territory_id,
            display_name,
            section: raw.section,
            image_file,
        });
    }

    entries
}
