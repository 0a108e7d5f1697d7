use crate::models::RelevantDocument;

/// Build the user prompt sent to the LLM.
///
/// Without context the model answers from its own knowledge. With context
/// the prompt instructs it to follow the knowledge base, including
/// procedural and escalation steps.
pub fn build_prompt(query: &str, context_docs: &[RelevantDocument]) -> String {
    if context_docs.is_empty() {
        return format!(
            "You are a helpful assistant. Answer the following question based on your knowledge.\n\n\
             Question: {query}\n\n\
             Provide a clear and concise answer."
        );
    }

    let context = format_context(context_docs);

    format!(
        "You are a helpful assistant for a company's internal knowledge base system.\n\n\
         The information below is from the company's verified knowledge base and represents \
         official procedures, processes, or solutions.\n\n\
         IMPORTANT: Always use and follow the provided context in your answer. This may include \
         technical steps, escalation procedures, contact information, meetings, or emails. All of \
         these are valid and important company processes.\n\n\
         Knowledge Base Context:\n\
         {context}\n\n\
         User Question: {query}\n\n\
         Instructions:\n\
         1. Base your answer on the provided knowledge base context\n\
         2. Include ALL steps mentioned (technical, procedural, contacts, escalations)\n\
         3. Present information clearly and in a user-friendly format\n\
         4. Do not dismiss or skip any documented steps\n\
         5. If the context provides a process to follow, explain it step-by-step\n\n\
         Provide a clear and actionable answer based on the company's documented process:"
    )
}

/// Numbered context blocks: `[Source i] (Relevance: NN%)` followed by the content
pub fn format_context(docs: &[RelevantDocument]) -> String {
    docs.iter()
        .enumerate()
        .map(|(idx, doc)| {
            let relevance = (1.0 - doc.distance) * 100.0;
            format!("[Source {}] (Relevance: {:.0}%)\n{}", idx + 1, relevance, doc.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metadata;

    fn doc(id: &str, content: &str, distance: f32) -> RelevantDocument {
        RelevantDocument {
            id: id.to_string(),
            content: content.to_string(),
            metadata: Metadata::new(),
            distance,
            similarity: 1.0 - distance,
        }
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = build_prompt("What is Rust?", &[]);
        assert!(prompt.contains("Question: What is Rust?"));
        assert!(!prompt.contains("Knowledge Base Context"));
    }

    #[test]
    fn test_prompt_with_context() {
        let docs = vec![doc("a", "Restart the router.", 0.1)];
        let prompt = build_prompt("Internet is down", &docs);
        assert!(prompt.contains("Knowledge Base Context:\n[Source 1] (Relevance: 90%)\nRestart the router."));
        assert!(prompt.contains("User Question: Internet is down"));
    }

    #[test]
    fn test_context_numbering() {
        let docs = vec![doc("a", "first", 0.2), doc("b", "second", 0.35)];
        let context = format_context(&docs);
        assert_eq!(
            context,
            "[Source 1] (Relevance: 80%)\nfirst\n\n[Source 2] (Relevance: 65%)\nsecond"
        );
    }
}
