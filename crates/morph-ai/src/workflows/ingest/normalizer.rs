const INVISIBLE: [char; 3] = ['\u{feff}', '\u{200b}', '\u{00a0}'];

/// Employee ids arrive from spreadsheets with stray BOMs and zero-width spaces.
pub(crate) fn normalize_id(value: &str) -> String {
    value.replace(INVISIBLE, "").trim().to_string()
}

/// Collapses runs of whitespace in names so lookups by name are stable.
pub(crate) fn normalize_name(value: &str) -> String {
    let cleaned = value.replace(INVISIBLE, " ");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_invisible_characters_from_ids() {
        assert_eq!(normalize_id("\u{feff}EMP001\u{200b} "), "EMP001");
    }

    #[test]
    fn collapses_name_whitespace() {
        assert_eq!(normalize_name("  Jane\u{00a0}  Doe "), "Jane Doe");
    }
}
