//! Static prefix tables used by the carrier lookup.
//!
//! All tables are ordered slices: lookups walk them in declaration order and
//! the first match wins. Entries are best-effort and not authoritative.

/// Carriers per ISO country, each with the national-number prefixes it owns.
pub const COUNTRY_CARRIERS: &[(&str, &[(&str, &[&str])])] = &[
    (
        "US",
        &[
            ("Verizon", &["201", "202", "212", "215", "218"]),
            ("AT&T", &["203", "214", "217"]),
            ("T-Mobile", &["213", "216"]),
            ("Sprint", &["219", "220"]),
        ],
    ),
    (
        "CA",
        &[
            ("Bell Canada", &["416", "905", "613"]),
            ("Rogers", &["437", "289", "343"]),
            ("Telus", &["647", "519"]),
        ],
    ),
    (
        "JO",
        &[
            ("Zain Jordan", &["77"]),
            ("Orange Jordan", &["78"]),
            ("Umniah", &["79"]),
        ],
    ),
    (
        "SA",
        &[
            ("STC", &["50", "51", "52", "53", "54", "55"]),
            ("Mobily", &["56", "57"]),
            ("Zain KSA", &["58", "59"]),
        ],
    ),
    (
        "AE",
        &[
            ("Etisalat", &["50", "51", "52", "54"]),
            ("du", &["55", "56", "58"]),
        ],
    ),
];

/// Flat `+<calling code><operator prefix>` table for when no parser is available.
pub const FLAT_CARRIERS: &[(&str, &str)] = &[
    ("+1201", "Verizon"),
    ("+1202", "Verizon"),
    ("+1203", "AT&T"),
    ("+1212", "Verizon"),
    ("+1213", "T-Mobile"),
    ("+1214", "AT&T"),
    ("+1215", "Verizon"),
    ("+1216", "T-Mobile"),
    ("+1217", "AT&T"),
    ("+1218", "Verizon"),
    ("+1416", "Bell Canada"),
    ("+1437", "Rogers"),
    ("+1647", "Telus"),
    ("+1905", "Bell Canada"),
    ("+1289", "Rogers"),
    ("+1519", "Telus"),
    ("+1613", "Bell Canada"),
    ("+1343", "Rogers"),
    ("+96277", "Zain Jordan"),
    ("+96278", "Orange Jordan"),
    ("+96279", "Umniah"),
    ("+96650", "STC"),
    ("+96651", "STC"),
    ("+96652", "STC"),
    ("+96653", "STC"),
    ("+96654", "STC"),
    ("+96655", "STC"),
    ("+96656", "Mobily"),
    ("+96657", "Mobily"),
    ("+96658", "Zain KSA"),
    ("+96659", "Zain KSA"),
    ("+97150", "Etisalat"),
    ("+97151", "Etisalat"),
    ("+97152", "Etisalat"),
    ("+97154", "Etisalat"),
    ("+97155", "du"),
    ("+97156", "du"),
    ("+97158", "du"),
];

pub const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("US", "United States"),
    ("CA", "Canada"),
    ("JO", "Jordan"),
    ("SA", "Saudi Arabia"),
    ("AE", "United Arab Emirates"),
    ("EG", "Egypt"),
    ("LB", "Lebanon"),
    ("SY", "Syria"),
    ("IQ", "Iraq"),
    ("KW", "Kuwait"),
    ("QA", "Qatar"),
    ("BH", "Bahrain"),
    ("OM", "Oman"),
    ("YE", "Yemen"),
    ("PS", "Palestine"),
    ("IL", "Israel"),
    ("TR", "Turkey"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("GB", "United Kingdom"),
    ("IT", "Italy"),
    ("ES", "Spain"),
];

/// Calling code to country name. `+1` comes first and covers both US and CA.
pub const CALLING_CODE_COUNTRIES: &[(&str, &str)] = &[
    ("+1", "United States / Canada"),
    ("+962", "Jordan"),
    ("+966", "Saudi Arabia"),
    ("+971", "United Arab Emirates"),
    ("+20", "Egypt"),
    ("+961", "Lebanon"),
    ("+963", "Syria"),
    ("+964", "Iraq"),
    ("+965", "Kuwait"),
    ("+974", "Qatar"),
    ("+973", "Bahrain"),
    ("+968", "Oman"),
    ("+967", "Yemen"),
    ("+970", "Palestine"),
    ("+972", "Israel"),
];

pub const REGIONS: &[(&str, &str)] = &[
    ("US", "North America"),
    ("CA", "North America"),
    ("JO", "Middle East"),
    ("SA", "Middle East"),
    ("AE", "Middle East"),
    ("EG", "Middle East"),
    ("LB", "Middle East"),
    ("SY", "Middle East"),
    ("IQ", "Middle East"),
    ("KW", "Middle East"),
    ("QA", "Middle East"),
    ("BH", "Middle East"),
    ("OM", "Middle East"),
    ("YE", "Middle East"),
    ("PS", "Middle East"),
];

/// Representative IANA zone per country.
pub const TIME_ZONES: &[(&str, &str)] = &[
    ("US", "America/New_York"),
    ("CA", "America/Toronto"),
    ("JO", "Asia/Amman"),
    ("SA", "Asia/Riyadh"),
    ("AE", "Asia/Dubai"),
    ("EG", "Africa/Cairo"),
    ("LB", "Asia/Beirut"),
    ("SY", "Asia/Damascus"),
    ("IQ", "Asia/Baghdad"),
    ("KW", "Asia/Kuwait"),
    ("QA", "Asia/Qatar"),
    ("BH", "Asia/Bahrain"),
    ("OM", "Asia/Muscat"),
    ("YE", "Asia/Aden"),
    ("PS", "Asia/Hebron"),
    ("IL", "Asia/Jerusalem"),
    ("TR", "Europe/Istanbul"),
    ("FR", "Europe/Paris"),
    ("DE", "Europe/Berlin"),
    ("GB", "Europe/London"),
    ("IT", "Europe/Rome"),
    ("ES", "Europe/Madrid"),
];

pub const UNKNOWN: &str = "Unknown";

fn lookup<'a>(table: &'a [(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// First carrier of `country` owning a prefix of `national_number`.
pub fn carrier_for_national(country: &str, national_number: &str) -> Option<&'static str> {
    let (_, carriers) = COUNTRY_CARRIERS.iter().find(|(iso, _)| *iso == country)?;
    carriers
        .iter()
        .find(|(_, prefixes)| prefixes.iter().any(|p| national_number.starts_with(p)))
        .map(|(name, _)| *name)
}

/// First flat entry whose prefix starts `number`: `(prefix, carrier)`.
pub fn flat_carrier(number: &str) -> Option<(&'static str, &'static str)> {
    FLAT_CARRIERS
        .iter()
        .find(|(prefix, _)| number.starts_with(prefix))
        .copied()
}

/// Country name for an ISO code, falling back to the code itself.
pub fn country_name(iso: &str) -> String {
    lookup(COUNTRY_NAMES, iso)
        .map(str::to_string)
        .unwrap_or_else(|| iso.to_string())
}

pub fn country_from_prefix(prefix: &str) -> &'static str {
    CALLING_CODE_COUNTRIES
        .iter()
        .find(|(code, _)| prefix.starts_with(code))
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN)
}

pub fn region(iso: &str) -> &'static str {
    lookup(REGIONS, iso).unwrap_or(UNKNOWN)
}

pub fn time_zone(iso: &str) -> Option<&'static str> {
    lookup(TIME_ZONES, iso)
}
