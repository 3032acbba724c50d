// Shared prompt fragments.
// Each module that calls the model keeps its own prompts.rs alongside it;
// this file holds the instructions every grounded call must carry.

/// Keeps the model inside the supplied context.
pub const GROUNDING_INSTRUCTION: &str = "\
    Answer ONLY from the job listings provided in the context. \
    Do NOT invent job titles, companies, locations or requirements. \
    If a detail is missing from a listing, say it is not stated.";

/// What the model must say when the context cannot support an answer.
pub const NO_MATCH_INSTRUCTION: &str = "\
    If the context is empty or none of the listings fit, reply that no strong \
    matches were found and suggest broadening the skills or location.";
