//! Entry identifiers: digit-system normalization and output path derivation.

use crate::book::Organization;

/// Map Devanagari and Gujarati digits to ASCII, leaving everything else as is.
pub fn to_ascii_digits(text: &str) -> String {
    text.chars().map(ascii_digit).collect()
}

fn ascii_digit(c: char) -> char {
    match c {
        '०'..='९' => char::from(b'0' + (c as u32 - '०' as u32) as u8),
        '૦'..='૯' => char::from(b'0' + (c as u32 - '૦' as u32) as u8),
        _ => c,
    }
}

/// Left-pad `s` with zeros to `width` characters.
fn zero_pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{s}", "0".repeat(width - len))
    }
}

/// A normalized number is usable when it is ASCII digits in non-empty,
/// dot-separated segments.
fn segments(ascii: &str) -> Option<Vec<&str>> {
    if ascii.is_empty() {
        return None;
    }
    let parts: Vec<&str> = ascii.split('.').collect();
    let valid = parts
        .iter()
        .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    valid.then_some(parts)
}

/// Relative output path (with `/` separators) for one entry.
///
/// `position` is the entry's 1-based index in the book; it names the file
/// when the number is missing or malformed, under a prefix that can never
/// clash with a numbered file.
pub fn entry_path(organization: Organization, number: &str, position: usize) -> String {
    let ascii = to_ascii_digits(number.trim());
    let Some(parts) = segments(&ascii) else {
        return format!("entry_pos_{position:04}.md");
    };

    match organization {
        Organization::HierarchicalByNumber if parts.len() >= 3 => format!(
            "adhyaya_{}/pada_{}/sutra_{}.md",
            parts[0],
            parts[1],
            zero_pad(parts[2], 3)
        ),
        _ => flat_name(&parts),
    }
}

fn flat_name(parts: &[&str]) -> String {
    let stem = parts
        .iter()
        .map(|p| zero_pad(p, 2))
        .collect::<Vec<_>>()
        .join("_");
    format!("entry_{stem}.md")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_devanagari_digits() {
        assert_eq!(to_ascii_digits("१.२.१५"), "1.2.15");
        assert_eq!(to_ascii_digits("०१२३४५६७८९"), "0123456789");
    }

    #[test]
    fn normalizes_gujarati_and_mixed_script() {
        assert_eq!(to_ascii_digits("૦૧૨૩૪૫૬૭૮૯"), "0123456789");
        assert_eq!(to_ascii_digits("३.૪.5"), "3.4.5");
        assert_eq!(to_ascii_digits("सूत्र १"), "सूत्र 1");
    }

    #[test]
    fn hierarchical_path_nests_adhyaya_and_pada() {
        assert_eq!(
            entry_path(Organization::HierarchicalByNumber, "1.2.15", 1),
            "adhyaya_1/pada_2/sutra_015.md"
        );
        assert_eq!(
            entry_path(Organization::HierarchicalByNumber, "८.४.६८", 1),
            "adhyaya_8/pada_4/sutra_068.md"
        );
    }

    #[test]
    fn flat_path_pads_each_segment() {
        assert_eq!(entry_path(Organization::Flat, "1.2.15", 1), "entry_01_02_15.md");
        assert_eq!(entry_path(Organization::Flat, "७", 1), "entry_07.md");
        assert_eq!(entry_path(Organization::Flat, "123", 1), "entry_123.md");
    }

    #[test]
    fn hierarchical_falls_back_to_flat_for_short_numbers() {
        assert_eq!(
            entry_path(Organization::HierarchicalByNumber, "1.2", 1),
            "entry_01_02.md"
        );
        assert_eq!(
            entry_path(Organization::GroupedByCategory, "1.0005", 1),
            "entry_01_0005.md"
        );
    }

    #[test]
    fn malformed_numbers_use_position() {
        assert_eq!(entry_path(Organization::Flat, "", 3), "entry_pos_0003.md");
        assert_eq!(entry_path(Organization::Flat, "अच्", 12), "entry_pos_0012.md");
        assert_eq!(
            entry_path(Organization::HierarchicalByNumber, "1..2", 5),
            "entry_pos_0005.md"
        );
    }

    #[test]
    fn distinct_numbers_give_distinct_paths() {
        let numbers = ["1", "1.1", "1.1.1", "1.1.10", "1.10.1", "10.1.1", "11"];
        let mut seen = std::collections::HashSet::new();
        for org in [Organization::Flat, Organization::HierarchicalByNumber] {
            seen.clear();
            for n in numbers {
                assert!(seen.insert(entry_path(org, n, 1)), "{n} collided under {org:?}");
            }
        }
    }
}
