//! File naming for exported strips.

/// Keep ASCII letters and digits, lowercased. Everything else is dropped.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// `sanitize(hint or "Booth_<id>") + ".png"`.
///
/// A hint that is blank, or sanitizes to nothing, falls back to the default.
pub fn artifact_file_name(record_id: &str, hint: Option<&str>) -> String {
    let from_hint = hint.map(sanitize).filter(|name| !name.is_empty());
    let base = from_hint.unwrap_or_else(|| sanitize(&format!("Booth_{}", record_id)));
    format!("{}.png", base)
}

/// Caption manifest written next to a strip (`foo.png` → `foo.json`).
pub fn manifest_file_name(file_name: &str) -> String {
    match file_name.strip_suffix(".png") {
        Some(stem) => format!("{}.json", stem),
        None => format!("{}.json", file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_and_lowercases() {
        assert_eq!(sanitize("Birthday_2026!"), "birthday2026");
        assert_eq!(sanitize("  Ünïcode & spaces  "), "ncodespaces");
        assert_eq!(sanitize("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize("___"), "");
    }

    #[test]
    fn test_default_name_from_id() {
        assert_eq!(artifact_file_name("X7K2Q", None), "boothx7k2q.png");
    }

    #[test]
    fn test_hint_wins() {
        assert_eq!(
            artifact_file_name("X7K2Q", Some("Party Night")),
            "partynight.png"
        );
    }

    #[test]
    fn test_empty_hint_falls_back() {
        assert_eq!(artifact_file_name("X7K2Q", Some("")), "boothx7k2q.png");
        assert_eq!(artifact_file_name("X7K2Q", Some("#!?")), "boothx7k2q.png");
    }

    #[test]
    fn test_manifest_name() {
        assert_eq!(manifest_file_name("boothx7k2q.png"), "boothx7k2q.json");
        assert_eq!(manifest_file_name("odd"), "odd.json");
    }
}
