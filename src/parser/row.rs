use std::sync::LazyLock;

use regex::Regex;

// Code column cell: [[Vehicle registration plates of <place>|CODE]]
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[Vehicle registration plates of [^|]+\|([A-Z]+)\]\]").unwrap()
});

// Every [[File:...]] / [[Image:...]] reference, in document order.
static FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[(?:File|Image):([^|\]]+)").unwrap());

/// Filename substrings (matched case-insensitively) that mark an image as a
/// euroband/strip rather than an example plate. Data-driven so new naming
/// variants can be added without touching the selection logic.
const STRIP_PATTERNS: &[&str] = &[
    "euroband",
    "eurobamd", // typo on the wiki for Estonia
    "-band.",
    "band.png",
    "band.svg",
    "section-with",
    "section_with",
    "eu-section",
    "non-eu-section",
    "identifier",
    "number plate band",
    "blank rear identifier",
];

/// Extract the registration code and the Example-column image from one raw
/// table row.
///
/// The columns are Country | Code | Strip | Example | Motorcycle | (Moped).
/// Strip images are small eurobands; the Example image is the full plate.
/// Column positions are unreliable in raw markup, so instead of counting
/// cells we drop every candidate whose filename looks like a strip and take
/// the first survivor: the Example column precedes the motorcycle/moped
/// variants, so the first non-strip file is the plate we want.
///
/// Returns `None` for header/separator rows (no code link), rows without any
/// file reference, and rows where every candidate is a strip.
pub fn classify(row_text: &str) -> Option<(String, String)> {
    let wiki_code = CODE_RE.captures(row_text)?.get(1)?.as_str().to_string();

    for caps in FILE_RE.captures_iter(row_text) {
        let filename = caps[1].trim();
        if !is_strip(filename) {
            return Some((wiki_code, format!("File:{}", filename)));
        }
    }

    None
}

fn is_strip(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    STRIP_PATTERNS.iter().any(|p| lower.contains(p))
}
