use std::collections::{BTreeMap, BTreeSet};

pub type Synonyms = BTreeMap<String, Vec<String>>;

/// Query variants to search: the normalized query plus the alternates of
/// every synonym key it contains (case-insensitive substring match).
pub fn expand(query: &str, synonyms: &Synonyms) -> BTreeSet<String> {
    let normalized = query.trim().to_lowercase();
    let mut variants = BTreeSet::new();
    for (key, alternates) in synonyms {
        if normalized.contains(&key.to_lowercase()) {
            variants.extend(alternates.iter().map(|alt| alt.to_lowercase()));
        }
    }
    variants.insert(normalized);
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synonyms(pairs: &[(&str, &[&str])]) -> Synonyms {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn no_key_matches() {
        let s = synonyms(&[("piar", &["plan individual"])]);
        let got = expand("acoso escolar en el aula", &s);
        assert_eq!(got.into_iter().collect::<Vec<_>>(), vec!["acoso escolar en el aula"]);
    }

    #[test]
    fn key_match_is_case_insensitive() {
        let s = synonyms(&[("piar", &["plan individual de ajustes razonables"])]);
        let got = expand("necesita un PIAR", &s);
        let want: BTreeSet<String> = ["necesita un piar", "plan individual de ajustes razonables"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn always_contains_normalized_query() {
        let s = synonyms(&[("Bullying", &["Acoso Escolar", "matoneo"]), ("x", &[])]);
        for q in ["  Bullying en clase ", "", "nada que ver", "X"] {
            let got = expand(q, &s);
            assert!(got.contains(&q.trim().to_lowercase()), "missing base variant for {q:?}");
        }
        let got = expand("bullying", &s);
        assert!(got.contains("acoso escolar"));
        assert!(got.contains("matoneo"));
    }

    #[test]
    fn alternates_are_deduplicated() {
        let s = synonyms(&[("piar", &["PIAR", "piar"])]);
        assert_eq!(expand("piar", &s).len(), 1);
    }
}
