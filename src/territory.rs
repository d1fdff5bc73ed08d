//! Static lookup tables mapping the vehicle registration codes used on the
//! wiki page to the ISO alpha-2 (or project-local) codes used in this
//! project, plus display names.

/// Wiki registration code → canonical territory id. Codes that already match
/// their canonical id are omitted only where the identity fallback covers
/// them; the dependent/disputed territories keep their non-ISO codes.
const WIKI_CODE_TO_ISO: &[(&str, &str)] = &[
    ("A", "AT"),
    ("B", "BE"),
    ("BIH", "BA"),
    ("BG", "BG"),
    ("HR", "HR"),
    ("CY", "CY"),
    ("CZ", "CZ"),
    ("DK", "DK"),
    ("EST", "EE"),
    ("FIN", "FI"),
    ("F", "FR"),
    ("D", "DE"),
    ("GR", "GR"),
    ("H", "HU"),
    ("IS", "IS"),
    ("IRL", "IE"),
    ("I", "IT"),
    ("LV", "LV"),
    ("FL", "LI"),
    ("LT", "LT"),
    ("L", "LU"),
    ("M", "MT"),
    ("MC", "MC"),
    ("MNE", "ME"),
    ("NL", "NL"),
    ("NMK", "MK"),
    ("N", "NO"),
    ("PL", "PL"),
    ("P", "PT"),
    ("RO", "RO"),
    ("RSM", "SM"),
    ("SRB", "RS"),
    ("SK", "SK"),
    ("SLO", "SI"),
    ("E", "ES"),
    ("S", "SE"),
    ("CH", "CH"),
    ("UA", "UA"),
    ("UK", "GB"),
    ("V", "VA"),
    ("AND", "AD"),
    ("AM", "AM"),
    ("AZ", "AZ"),
    ("GE", "GE"),
    ("RUS", "RU"),
    ("TR", "TR"),
    // Dependent territories
    ("AX", "AX"),   // Aland
    ("GBA", "GBA"), // Alderney
    ("FO", "FO"),   // Faroe Islands
    ("GBZ", "GBZ"), // Gibraltar
    ("GBG", "GBG"), // Guernsey
    ("GBM", "GBM"), // Isle of Man
    ("GBJ", "GBJ"), // Jersey
    // Disputed territories
    ("ABH", "ABH"),   // Abkhazia
    ("RKS", "XK"),    // Kosovo
    ("TRNC", "TRNC"), // Northern Cyprus
    ("RSO", "RSO"),   // South Ossetia
    ("PMR", "PMR"),   // Transnistria
];

/// Canonical territory id → display name.
const TERRITORY_NAMES: &[(&str, &str)] = &[
    ("AL", "Albania"),
    ("AD", "Andorra"),
    ("AT", "Austria"),
    ("BY", "Belarus"),
    ("BE", "Belgium"),
    ("BA", "Bosnia and Herzegovina"),
    ("BG", "Bulgaria"),
    ("HR", "Croatia"),
    ("CY", "Cyprus"),
    ("CZ", "Czech Republic"),
    ("DK", "Denmark"),
    ("EE", "Estonia"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("GR", "Greece"),
    ("HU", "Hungary"),
    ("IS", "Iceland"),
    ("IE", "Ireland"),
    ("IT", "Italy"),
    ("LV", "Latvia"),
    ("LI", "Liechtenstein"),
    ("LT", "Lithuania"),
    ("LU", "Luxembourg"),
    ("MT", "Malta"),
    ("MD", "Moldova"),
    ("MC", "Monaco"),
    ("ME", "Montenegro"),
    ("NL", "Netherlands"),
    ("MK", "North Macedonia"),
    ("NO", "Norway"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("RO", "Romania"),
    ("SM", "San Marino"),
    ("RS", "Serbia"),
    ("SK", "Slovakia"),
    ("SI", "Slovenia"),
    ("ES", "Spain"),
    ("SE", "Sweden"),
    ("CH", "Switzerland"),
    ("UA", "Ukraine"),
    ("GB", "United Kingdom"),
    ("VA", "Vatican City"),
    ("AM", "Armenia"),
    ("AZ", "Azerbaijan"),
    ("GE", "Georgia"),
    ("RU", "Russia"),
    ("TR", "Turkey"),
    ("AX", "Aland Islands"),
    ("GBA", "Alderney"),
    ("FO", "Faroe Islands"),
    ("GBZ", "Gibraltar"),
    ("GBG", "Guernsey"),
    ("GBM", "Isle of Man"),
    ("GBJ", "Jersey"),
    ("ABH", "Abkhazia"),
    ("XK", "Kosovo"),
    ("TRNC", "Northern Cyprus"),
    ("RSO", "South Ossetia"),
    ("PMR", "Transnistria"),
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Map a wiki registration code to (territory id, display name).
///
/// Total: an unmapped code falls back to itself as the id, and the id falls
/// back to the wiki code as the name. The page intentionally lists disputed
/// and dependent territories without standard ISO codes.
pub fn canonicalize(wiki_code: &str) -> (String, String) {
    let id = lookup(WIKI_CODE_TO_ISO, wiki_code).unwrap_or(wiki_code);
    let name = lookup(TERRITORY_NAMES, id).unwrap_or(wiki_code);
    (id.to_string(), name.to_string())
}
