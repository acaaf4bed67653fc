//! Column-name normalization and the alias table for tabular input.

use super::FEATURE_NAMES;

/// Normalized header spelling → canonical feature name.
///
/// The abbreviated spellings are the ones emitted by common flow exporters;
/// the normalized canonical names are accepted as well (four of them
/// coincide with an abbreviation).
pub const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("flowduration", "Flow Duration"),
    ("totfwdpkts", "Total Fwd Packets"),
    ("totbwdpkts", "Total Backward Packets"),
    ("totlenfwdpkts", "Total Length of Fwd Packets"),
    ("fwdpktlenmax", "Fwd Packet Length Max"),
    ("flowiatmean", "Flow IAT Mean"),
    ("fwdiattot", "Fwd IAT Total"),
    ("fwdiatmean", "Fwd IAT Mean"),
    ("fwdpshflags", "Fwd PSH Flags"),
    ("finflagcnt", "FIN Flag Count"),
    ("totalfwdpackets", "Total Fwd Packets"),
    ("totalbackwardpackets", "Total Backward Packets"),
    ("totallengthoffwdpackets", "Total Length of Fwd Packets"),
    ("fwdpacketlengthmax", "Fwd Packet Length Max"),
    ("fwdiattotal", "Fwd IAT Total"),
    ("finflagcount", "FIN Flag Count"),
];

/// Trim, lower-case, and drop spaces, underscores and hyphens.
pub fn normalize_column(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical feature name for a raw header, if it is one of ours.
pub fn canonical_name(raw: &str) -> Option<&'static str> {
    let key = normalize_column(raw);
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
}

/// Position of a canonical name in the feature vector.
pub(crate) fn feature_index(canonical: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|n| *n == canonical)
}
