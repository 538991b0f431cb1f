//! Turns a ranked hit pool into the short templated answer shown to users.

use crate::config::AppConfig;
use crate::types::{field_meta_key, Answer, Hit, Source};

pub const INSUFFICIENT_EVIDENCE: &str = "No hay evidencia suficiente en el archivo para responder esa pregunta.";

const MAX_BULLETS: usize = 3;
const TOPIC_CHARS: usize = 120;
const SYNTHESIS_CHARS: usize = 140;

pub struct AnswerFormatter {
    distance_max: f32,
    min_hits: usize,
    topic_key: String,
    synthesis_keys: Vec<String>,
}

impl AnswerFormatter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            distance_max: config.retrieval.distance_max,
            min_hits: config.retrieval.min_hits,
            topic_key: field_meta_key(&config.answer.topic_field),
            synthesis_keys: config.answer.synthesis_fields.iter().map(|f| field_meta_key(f)).collect(),
        }
    }

    /// Strong evidence when at least `min_hits` hits are within `distance_max`
    /// (inclusive); otherwise fall back to the head of the full pool and say so.
    pub fn format(&self, query: &str, ranked: &[Hit]) -> Answer {
        let filtered: Vec<&Hit> = ranked.iter().filter(|h| h.distance <= self.distance_max).collect();
        let strong = filtered.len() >= self.min_hits;
        let selected: Vec<&Hit> = if strong {
            filtered.iter().take(MAX_BULLETS).copied().collect()
        } else {
            ranked.iter().take(MAX_BULLETS).collect()
        };
        if selected.is_empty() {
            return Answer { text: INSUFFICIENT_EVIDENCE.to_string(), sources: Vec::new() };
        }

        let (count, kind) = if strong { (filtered.len(), "claras") } else { (ranked.len(), "posibles") };
        let mut intro = format!("Sobre “{query}”, encontré {count} referencias {kind} en el archivo.");
        if !strong {
            intro.push_str(" (evidencia débil).");
        }
        let bullets: Vec<String> = selected.iter().map(|h| self.bullet(h)).collect();

        Answer {
            text: format!("{intro}\n\n{}", bullets.join("\n")),
            sources: selected.iter().map(|h| Source { id: h.id.clone(), distance: round4(h.distance) }).collect(),
        }
    }

    fn bullet(&self, hit: &Hit) -> String {
        let topic = truncate_chars(hit.meta(&self.topic_key).unwrap_or(""), TOPIC_CHARS);
        let synthesis = self
            .synthesis_keys
            .iter()
            .filter_map(|k| hit.meta(k))
            .find(|s| !s.is_empty())
            .unwrap_or("");
        let synthesis = if synthesis.chars().count() > SYNTHESIS_CHARS {
            format!("{}…", truncate_chars(synthesis, SYNTHESIS_CHARS))
        } else {
            synthesis.to_string()
        };
        format!("- Caso {}: {} — {}", hit.id, topic, synthesis).trim_end().to_string()
    }
}

pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn round4(distance: f32) -> f64 {
    (f64::from(distance) * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Meta;

    fn config(distance_max: f32, min_hits: usize) -> AppConfig {
        let mut cfg = AppConfig::from_yaml_str(
            "data_path: x.xlsx\nid_col: ID\ntext_fields: [t]\nchroma: { persist_dir: db, collection: c }\n",
        )
        .expect("config");
        cfg.retrieval.distance_max = distance_max;
        cfg.retrieval.min_hits = min_hits;
        cfg
    }

    fn hit(id: &str, distance: f32) -> Hit {
        let mut metadata = Meta::new();
        metadata.insert("m_Tema - subtema".into(), format!("Tema {id}"));
        metadata.insert("m_síntesis".into(), format!("Síntesis {id}"));
        Hit { id: id.into(), document: String::new(), distance, metadata }
    }

    #[test]
    fn empty_pool_is_insufficient() {
        let answer = AnswerFormatter::new(&config(0.70, 1)).format("q", &[]);
        assert_eq!(answer.text, INSUFFICIENT_EVIDENCE);
        assert!(answer.sources.is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let answer = AnswerFormatter::new(&config(0.70, 1)).format("acoso", &[hit("1", 0.70)]);
        assert!(answer.text.contains("referencias claras"), "{}", answer.text);
        assert!(!answer.text.contains("evidencia débil"));
        assert_eq!(answer.sources, vec![Source { id: "1".into(), distance: 0.7 }]);
    }

    #[test]
    fn just_above_threshold_is_weak() {
        let answer = AnswerFormatter::new(&config(0.70, 1)).format("acoso", &[hit("1", 0.7001)]);
        assert!(answer.text.starts_with("Sobre “acoso”, encontré 1 referencias posibles en el archivo. (evidencia débil)."));
        assert_eq!(answer.sources.len(), 1);
        assert!((answer.sources[0].distance - 0.7001).abs() < 1e-9);
    }

    #[test]
    fn strong_path_counts_filtered_and_caps_bullets() {
        let pool: Vec<Hit> = [0.1, 0.2, 0.3, 0.4, 0.9].iter().enumerate().map(|(i, d)| hit(&i.to_string(), *d)).collect();
        let answer = AnswerFormatter::new(&config(0.70, 1)).format("q", &pool);
        assert!(answer.text.contains("encontré 4 referencias claras"));
        assert_eq!(answer.sources.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), vec!["0", "1", "2"]);
        assert!(answer.text.contains("- Caso 0: Tema 0 — Síntesis 0"));
    }

    #[test]
    fn min_hits_not_met_reports_full_pool() {
        let pool = vec![hit("a", 0.5), hit("b", 0.8), hit("c", 0.9), hit("d", 0.95)];
        let answer = AnswerFormatter::new(&config(0.70, 2)).format("q", &pool);
        assert!(answer.text.contains("encontré 4 referencias posibles"));
        assert_eq!(answer.sources.len(), 3);
    }

    #[test]
    fn long_synthesis_is_truncated_with_ellipsis() {
        let mut h = hit("x", 0.1);
        h.metadata.insert("m_síntesis".into(), "ñ".repeat(200));
        let answer = AnswerFormatter::new(&config(0.70, 1)).format("q", &[h]);
        let line = answer.text.lines().last().expect("bullet");
        assert!(line.ends_with(&format!("{}…", "ñ".repeat(140))));
    }

    #[test]
    fn falls_back_to_unaccented_synthesis_and_trims_empty_tail() {
        let mut metadata = Meta::new();
        metadata.insert("m_sintesis".into(), "sin tilde".into());
        let h = Hit { id: "9".into(), document: String::new(), distance: 0.2, metadata };
        let answer = AnswerFormatter::new(&config(0.70, 1)).format("q", &[h]);
        assert!(answer.text.ends_with("- Caso 9:  — sin tilde"));

        let bare = Hit { id: "8".into(), document: String::new(), distance: 0.2, metadata: Meta::new() };
        let answer = AnswerFormatter::new(&config(0.70, 1)).format("q", &[bare]);
        assert!(answer.text.ends_with("- Caso 8:  —"));
    }

    #[test]
    fn rounds_to_four_places() {
        assert!((round4(0.123_456) - 0.1235).abs() < 1e-9);
    }
}
