//! Matcher: retrieves candidate postings and asks the language model to rank
//! and explain them.
//!
//! Composition is "stuff": every retrieved listing is concatenated into one
//! prompt. That only works while `k` stays small, so the context block is
//! capped at `max_context_chars` and anything past the cap is dropped with a
//! warning. A larger `k` needs a map-reduce style composition instead.

use std::sync::Arc;

use tracing::{info, warn};

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, NO_MATCH_INSTRUCTION};
use crate::llm_client::LanguageModel;
use crate::rag::document::IndexedDocument;
use crate::rag::error::RagError;
use crate::rag::prompts::{
    EMPTY_CONTEXT, MATCH_INSTRUCTION_TEMPLATE, MATCH_PROMPT_TEMPLATE, MATCH_SYSTEM_TEMPLATE,
};
use crate::rag::retriever::Retriever;

pub struct Matcher {
    retriever: Retriever,
    llm: Arc<dyn LanguageModel>,
    shortlist_size: usize,
    max_context_chars: usize,
}

impl Matcher {
    pub fn new(
        retriever: Retriever,
        llm: Arc<dyn LanguageModel>,
        shortlist_size: usize,
        max_context_chars: usize,
    ) -> Self {
        Self {
            retriever,
            llm,
            shortlist_size,
            max_context_chars,
        }
    }

    /// Ranked, explained recommendations for `skills_query` near `location`.
    ///
    /// Every call re-embeds the instruction and calls the model again; there
    /// is no cache, so freshly ingested postings are always considered.
    pub async fn match_jobs(&self, skills_query: &str, location: &str) -> Result<String, RagError> {
        let instruction = build_instruction(skills_query, location, self.shortlist_size);
        let documents = self.retriever.retrieve_for_match(&instruction).await?;
        let context = assemble_context(&documents, self.max_context_chars);

        let prompt = build_prompt(&context, &instruction);
        let system = fill_template(
            MATCH_SYSTEM_TEMPLATE,
            &[
                ("grounding_instruction", GROUNDING_INSTRUCTION),
                ("no_match_instruction", NO_MATCH_INSTRUCTION),
            ],
        );

        info!(
            "Matching {} retrieved jobs with {} (shortlist {})",
            documents.len(),
            self.llm.model(),
            self.shortlist_size
        );
        let answer = self.llm.generate(&prompt, &system).await?;
        Ok(answer)
    }
}

/// The request sent to the model, and also the retrieval query.
pub fn build_instruction(skills_query: &str, location: &str, shortlist_size: usize) -> String {
    fill_template(
        MATCH_INSTRUCTION_TEMPLATE,
        &[
            ("location", location.trim()),
            ("skills", skills_query.trim()),
            ("shortlist_size", &shortlist_size.to_string()),
        ],
    )
}

/// Listings first, then the request.
pub fn build_prompt(context: &str, instruction: &str) -> String {
    fill_template(
        MATCH_PROMPT_TEMPLATE,
        &[("context", context), ("instruction", instruction)],
    )
}

/// Substitutes `{key}` placeholders in a single left-to-right pass.
/// Inserted values are never rescanned, so braces in user or provider text
/// stay literal. Unknown placeholders are left as they are.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = values
            .iter()
            .find(|(key, _)| tail.starts_with(key) && tail[key.len()..].starts_with('}'));
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Concatenates listings in retrieval order until `max_chars` is reached.
/// A single listing longer than the budget is truncated rather than lost.
pub fn assemble_context(documents: &[IndexedDocument], max_chars: usize) -> String {
    if documents.is_empty() {
        return EMPTY_CONTEXT.to_string();
    }

    let mut context = String::new();
    let mut included = 0;
    for (n, doc) in documents.iter().enumerate() {
        let separator = if context.is_empty() { "" } else { "\n\n" };
        let block = format!("{separator}[Listing {}]\n{}", n + 1, doc.text);
        let used = context.chars().count();
        let block_len = block.chars().count();

        if used + block_len > max_chars {
            if included == 0 {
                context.extend(block.chars().take(max_chars));
                included = 1;
            }
            break;
        }
        context.push_str(&block);
        included += 1;
    }

    if included < documents.len() {
        warn!(
            "Context budget of {} chars reached: kept {} of {} listings",
            max_chars,
            included,
            documents.len()
        );
    }
    context
}
