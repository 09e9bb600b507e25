// Grounding prompt for the answer generator
use crate::rag::retrieval::ContextSet;

/// Exact sentence the model must return when the context lacks the answer
pub const NOT_FOUND_ANSWER: &str = "I cannot find the answer in the provided PDF.";

/// Separator between context chunks in the prompt
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Join context chunks into one block
pub fn context_block(context: &ContextSet) -> String {
    context.as_slice().join(CHUNK_SEPARATOR)
}

/// Build the strict grounding prompt for one question
pub fn grounded_prompt(question: &str, context: &ContextSet) -> String {
    format!(
        r#"You are a professional technical assistant. Answer the user's question using ONLY the provided Context.

STRICT RULES:
1. Provide a COMPREHENSIVE and DETAILED answer based on the available information in the context.
2. If the context contains a full explanation, include all the key technical points.
3. If the Context does not contain the answer, say exactly: "Answer: {not_found}" and "Score: 0.0"
4. Do NOT explain why you cannot find the answer or use external knowledge.
5. The Score must be a clean numerical value between 0.0 and 1.0. Do NOT include extra symbols like asterisks, tags, or internal reasoning.

Context:
{context}

Question:
{question}

Required Output Format:
Answer: [Provide the full, detailed response here]
Score: [Numerical value only, e.g., 1.0]
"#,
        not_found = NOT_FOUND_ANSWER,
        context = context_block(context),
        question = question,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(items: &[&str]) -> ContextSet {
        ContextSet::new(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_chunks_joined_with_blank_line() {
        let block = context_block(&context(&["first chunk", "second chunk"]));
        assert_eq!(block, "first chunk\n\nsecond chunk");
    }

    #[test]
    fn test_prompt_contains_question_and_context() {
        let prompt = grounded_prompt(
            "What is task decomposition?",
            &context(&["Task decomposition splits goals."]),
        );
        assert!(prompt.contains("What is task decomposition?"));
        assert!(prompt.contains("Task decomposition splits goals."));
        assert!(prompt.contains("Answer: [Provide"));
        assert!(prompt.contains("Score: [Numerical value only"));
    }

    #[test]
    fn test_prompt_mandates_literal_fallback() {
        let prompt = grounded_prompt("q", &ContextSet::default());
        assert!(prompt.contains(&format!("\"Answer: {}\"", NOT_FOUND_ANSWER)));
        assert!(prompt.contains("\"Score: 0.0\""));
        assert!(prompt.contains("ONLY the provided Context"));
    }

    #[test]
    fn test_empty_context_still_builds() {
        let prompt = grounded_prompt("q", &ContextSet::default());
        assert!(prompt.contains("Context:\n\n\nQuestion:"));
    }
}
