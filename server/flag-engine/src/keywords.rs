//! Keyword tiers scanned by the flag rules.
//!
//! Tier order matters: the critical tier is always checked before the high-risk tier, and
//! inside a tier the first keyword in list order wins.

/// Critical keywords; scanned in description, title and type.
pub const CRITICAL_KEYWORDS: &[&str] = &[
  "harassment",
  "assault",
  "threat",
  "violence",
  "fraud",
  "discrimination",
];

/// High-risk keywords; scanned in description and title.
pub const HIGH_RISK_KEYWORDS: &[&str] = &[
  "unsafe",
  "retaliation",
  "abuse",
  "hostile",
  "danger",
  "weapon",
];

/// First keyword (in list order) contained in any of the fields, case-insensitively.
pub fn first_match(fields: &[&str], keywords: &[&'static str]) -> Option<&'static str> {
  let lowered: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();
  keywords
    .iter()
    .copied()
    .find(|kw| lowered.iter().any(|field| field.contains(kw)))
}
