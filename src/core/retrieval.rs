use crate::models::{DocumentSummary, QueryHit, RelevantDocument, Source, StoredDocument};

/// Number of characters shown in content previews
pub const PREVIEW_CHARS: usize = 200;

/// Keep the hits whose similarity (`1 - distance`) reaches the threshold.
///
/// Order is preserved, so ranked input stays ranked.
pub fn select_relevant(hits: Vec<QueryHit>, threshold: f32) -> Vec<RelevantDocument> {
    hits.into_iter()
        .map(RelevantDocument::from)
        .filter(|doc| doc.similarity >= threshold)
        .collect()
}

/// First `PREVIEW_CHARS` characters, with "..." appended when truncated
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Format a similarity in [0, 1] as a percentage with one decimal
pub fn format_similarity(similarity: f32) -> String {
    format!("{:.1}%", similarity * 100.0)
}

pub fn to_source(doc: &RelevantDocument) -> Source {
    Source {
        id: doc.id.clone(),
        content: preview(&doc.content),
        similarity: format_similarity(doc.similarity),
        metadata: doc.metadata.clone(),
    }
}

pub fn to_summary(doc: &StoredDocument) -> DocumentSummary {
    DocumentSummary {
        id: doc.id.clone(),
        content: preview(&doc.content),
        metadata: doc.metadata.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metadata;

    fn hit(id: &str, distance: f32) -> QueryHit {
        QueryHit {
            id: id.to_string(),
            content: format!("content {}", id),
            metadata: Metadata::new(),
            distance,
        }
    }

    #[test]
    fn test_threshold_filter() {
        let hits = vec![hit("a", 0.1), hit("b", 0.3), hit("c", 0.45)];
        let relevant = select_relevant(hits, 0.6);

        let ids: Vec<_> = relevant.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!((relevant[0].similarity - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_zero_threshold_keeps_all_non_negative() {
        let relevant = select_relevant(vec![hit("a", 0.2), hit("b", 1.0), hit("c", 1.3)], 0.0);
        assert_eq!(relevant.len(), 2);
    }

    #[test]
    fn test_preview_truncation() {
        let short = "short text";
        assert_eq!(preview(short), short);

        let exact = "x".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&exact), exact);

        let long = "y".repeat(PREVIEW_CHARS + 1);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_preview_multibyte() {
        let text = "é".repeat(PREVIEW_CHARS + 10);
        let p = preview(&text);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_source_similarity_format() {
        let doc = RelevantDocument::from(hit("a", 0.125));
        let source = to_source(&doc);
        assert_eq!(source.similarity, "87.5%");
        assert_eq!(source.content, "content a");
    }
}
