/// Normalize a raw cell value: absent becomes `""`, whitespace runs collapse
/// to one space, ends are trimmed.
pub fn clean(value: Option<&str>) -> String {
    match value {
        None => String::new(),
        Some(s) => s.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::clean;

    #[test]
    fn absent_is_empty() {
        assert_eq!(clean(None), "");
    }

    #[test]
    fn collapses_and_trims() {
        assert_eq!(clean(Some("  a   b\n\tc  ")), "a b c");
        assert_eq!(clean(Some("   ")), "");
        assert_eq!(clean(Some("ya limpio")), "ya limpio");
    }
}
