// Prompt templates for job matching.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for the matcher.
/// Replace: {grounding_instruction}, {no_match_instruction}
pub const MATCH_SYSTEM_TEMPLATE: &str = "You are a careful career assistant who \
    recommends job postings to a candidate. {grounding_instruction} {no_match_instruction}";

/// The candidate's request. Also used verbatim as the retrieval query.
/// Replace: {location}, {skills}, {shortlist_size}
pub const MATCH_INSTRUCTION_TEMPLATE: &str = r#"A candidate is looking for jobs in '{location}' and has the following skills: '{skills}'.
From the job listings below, recommend the top {shortlist_size} jobs located in or near '{location}' that best match their skills.
For each job, return:
- Job Title
- Company
- Location
- Why it's a good match"#;

/// Full user prompt: retrieved listings first, then the request.
/// Replace: {context}, {instruction}
pub const MATCH_PROMPT_TEMPLATE: &str = r#"JOB LISTINGS:
{context}

REQUEST:
{instruction}"#;

/// Stands in for the listings block when retrieval found nothing.
pub const EMPTY_CONTEXT: &str = "(no job listings available)";
