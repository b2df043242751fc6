/// Glyph shown when a country has no known ISO code.
pub const FALLBACK_FLAG: &str = "🏳️";

// Country display names as the athletes table stores them.
const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("Afghanistan", "AF"),
    ("Albania", "AL"),
    ("Algeria", "DZ"),
    ("Andorra", "AD"),
    ("Argentina", "AR"),
    ("Armenia", "AM"),
    ("Australia", "AU"),
    ("Austria", "AT"),
    ("Azerbaijan", "AZ"),
    ("Belarus", "BY"),
    ("Belgium", "BE"),
    ("Benin", "BJ"),
    ("Bhutan", "BT"),
    ("Bosnia And Herzegovina", "BA"),
    ("Brazil", "BR"),
    ("Bulgaria", "BG"),
    ("Canada", "CA"),
    ("Cape Verde", "CV"),
    ("Chile", "CL"),
    ("Chinese Taipei", "TW"),
    ("Colombia", "CO"),
    ("Croatia", "HR"),
    ("Cyprus", "CY"),
    ("Czechia", "CZ"),
    ("Denmark", "DK"),
    ("Dominican Republic", "DO"),
    ("Ecuador", "EC"),
    ("Eritrea", "ER"),
    ("Estonia", "EE"),
    ("Finland", "FI"),
    ("France", "FR"),
    ("Georgia", "GE"),
    ("Germany", "DE"),
    ("Ghana", "GH"),
    ("Great Britain", "GB"),
    ("Greece", "GR"),
    ("Guinea-bissau", "GW"),
    ("Haiti", "HT"),
    ("Hong Kong, China", "HK"),
    ("Hungary", "HU"),
    ("Iceland", "IS"),
    ("India", "IN"),
    ("Iran", "IR"),
    ("Ireland", "IE"),
    ("Israel", "IL"),
    ("Italy", "IT"),
    ("Jamaica", "JM"),
    ("Japan", "JP"),
    ("Jordan", "JO"),
    ("Kazakhstan", "KZ"),
    ("Kenya", "KE"),
    ("Korea", "KR"),
    ("Kosovo", "XK"),
    ("Kuwait", "KW"),
    ("Kyrgyzstan", "KG"),
    ("Latvia", "LV"),
    ("Lebanon", "LB"),
    ("Liechtenstein", "LI"),
    ("Lithuania", "LT"),
    ("Luxembourg", "LU"),
    ("Madagascar", "MG"),
    ("Malaysia", "MY"),
    ("Malta", "MT"),
    ("Marocco", "MA"),
    ("Mexico", "MX"),
    ("Monaco", "MC"),
    ("Mongolia", "MN"),
    ("Montenegro", "ME"),
    ("Nepal", "NP"),
    ("Netherlands", "NL"),
    ("New Zealand", "NZ"),
    ("North Macedonia", "MK"),
    ("Norway", "NO"),
    ("P.r. China", "CN"),
    ("Pakistan", "PK"),
    ("Peru", "PE"),
    ("Philippines", "PH"),
    ("Poland", "PL"),
    ("Portugal", "PT"),
    ("Puerto Rico", "PR"),
    ("Republic Of San Marino", "SM"),
    ("Romania", "RO"),
    ("Russia", "RU"),
    ("Saudi Arabia", "SA"),
    ("Serbia", "RS"),
    ("Singapore", "SG"),
    ("Slovakia", "SK"),
    ("Slovenia", "SI"),
    ("South Africa", "ZA"),
    ("Spain", "ES"),
    ("Sweden", "SE"),
    ("Switzerland", "CH"),
    ("Tajikistan", "TJ"),
    ("Thailand", "TH"),
    ("Timor-leste", "TL"),
    ("Tonga", "TO"),
    ("Trinidad & Tobago", "TT"),
    ("Türkiye", "TR"),
    ("Ukraine", "UA"),
    ("United Arab Emirates", "AE"),
    ("United States Of America", "US"),
    ("Uruguay", "UY"),
    ("Uzbekistan", "UZ"),
    ("Venezuela", "VE"),
];

// Three-letter federation codes used in event locations, e.g. "Soelden (AUT)".
const FEDERATION_CODES: &[(&str, &str)] = &[
    ("AND", "AD"),
    ("ARG", "AR"),
    ("AUS", "AU"),
    ("AUT", "AT"),
    ("BRA", "BR"),
    ("BUL", "BG"),
    ("CAN", "CA"),
    ("CHI", "CL"),
    ("CHN", "CN"),
    ("CRO", "HR"),
    ("CZE", "CZ"),
    ("ESP", "ES"),
    ("FIN", "FI"),
    ("FRA", "FR"),
    ("GBR", "GB"),
    ("GER", "DE"),
    ("ITA", "IT"),
    ("JPN", "JP"),
    ("KOR", "KR"),
    ("LIE", "LI"),
    ("NOR", "NO"),
    ("NZL", "NZ"),
    ("POL", "PL"),
    ("RUS", "RU"),
    ("SLO", "SI"),
    ("SRB", "RS"),
    ("SUI", "CH"),
    ("SVK", "SK"),
    ("SWE", "SE"),
    ("USA", "US"),
];

/// Flag glyph for a country display name ("Italy") or federation code ("ITA").
pub fn flag_for(country: &str) -> String {
    iso_code_for(country)
        .map(regional_indicator_pair)
        .unwrap_or_else(|| FALLBACK_FLAG.to_string())
}

pub fn iso_code_for(country: &str) -> Option<&'static str> {
    let trimmed = country.trim();
    if trimmed.is_empty() {
        return None;
    }
    COUNTRY_NAMES
        .iter()
        .chain(FEDERATION_CODES.iter())
        .find(|(name, _)| *name == trimmed)
        .map(|(_, iso)| *iso)
}

/// Federation codes offered by the event country filter, sorted.
pub fn federation_codes() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = FEDERATION_CODES.iter().map(|(code, _)| *code).collect();
    codes.sort_unstable();
    codes
}

/// Athlete country names offered by the athlete country filter.
pub fn country_names() -> impl Iterator<Item = &'static str> {
    COUNTRY_NAMES.iter().map(|(name, _)| *name)
}

fn regional_indicator_pair(iso: &str) -> String {
    iso.chars()
        .filter_map(|c| {
            let upper = c.to_ascii_uppercase();
            if upper.is_ascii_uppercase() {
                char::from_u32(0x1F1E6 + (upper as u32 - 'A' as u32))
            } else {
                None
            }
        })
        .collect()
}
