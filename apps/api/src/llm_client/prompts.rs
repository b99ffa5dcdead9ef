// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Honesty rule appended to every prompt that writes on the candidate's behalf.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Do not invent skills, employers, titles, dates or achievements. \
    Every statement about the candidate must be supported by the resume text provided. \
    If the resume does not support a claim, leave it out.";

/// Tone rule shared by resume and cover letter writing.
pub const TONE_INSTRUCTION: &str = "\
    Write with humble competence: plain, direct English, no metaphors, \
    no strong adjectives, no quotation marks for emphasis. \
    It must read as written by a person, not a machine.";
