//! Industry and subindustry taxonomy.
//!
//! A small closed table mapping lowercase keys to canonical labels. Exact
//! lookup only; unmapped values yield `None` so callers can carry the raw
//! value through without claiming it was normalized.

/// (lowercase key, canonical label) for top-level industries.
const INDUSTRIES: &[(&str, &str)] = &[
    ("agriculture", "Agriculture"),
    ("automotive", "Automotive"),
    ("banking", "Banking"),
    ("construction", "Construction"),
    ("consulting", "Consulting"),
    ("consumer goods", "Consumer Goods"),
    ("education", "Education"),
    ("energy", "Energy"),
    ("financial services", "Financial Services"),
    ("government", "Government"),
    ("healthcare", "Healthcare"),
    ("hospitality", "Hospitality"),
    ("information technology", "Information Technology"),
    ("insurance", "Insurance"),
    ("legal", "Legal"),
    ("logistics", "Logistics"),
    ("manufacturing", "Manufacturing"),
    ("media", "Media"),
    ("pharmaceuticals", "Pharmaceuticals"),
    ("real estate", "Real Estate"),
    ("retail", "Retail"),
    ("software", "Software"),
    ("technology", "Technology"),
    ("telecommunications", "Telecommunications"),
    ("transportation", "Transportation"),
];

/// (lowercase key, canonical label) for subindustries.
const SUBINDUSTRIES: &[(&str, &str)] = &[
    ("artificial intelligence", "Artificial Intelligence"),
    ("biotechnology", "Biotechnology"),
    ("cloud computing", "Cloud Computing"),
    ("cybersecurity", "Cybersecurity"),
    ("data analytics", "Data Analytics"),
    ("e-commerce", "E-Commerce"),
    ("fintech", "Fintech"),
    ("investment banking", "Investment Banking"),
    ("machine learning", "Machine Learning"),
    ("medical devices", "Medical Devices"),
    ("mobile apps", "Mobile Apps"),
    ("renewable energy", "Renewable Energy"),
    ("saas", "SaaS"),
    ("semiconductors", "Semiconductors"),
    ("wealth management", "Wealth Management"),
];

fn exact_lookup(table: &'static [(&str, &str)], raw: &str) -> Option<String> {
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| (*label).to_string())
}

/// Maps a raw industry value to its canonical label, if known.
#[must_use]
pub fn normalize_industry(raw: &str) -> Option<String> {
    exact_lookup(INDUSTRIES, raw)
}

/// Maps a raw subindustry value to its canonical label, if known.
#[must_use]
pub fn normalize_subindustry(raw: &str) -> Option<String> {
    exact_lookup(SUBINDUSTRIES, raw)
}
