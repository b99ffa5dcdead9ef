// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for fast-mode metadata extraction.
pub const EXTRACT_SYSTEM: &str = "You are an expert job description analyst. \
    Extract the company name, the job title and a clean version of a job posting.";

/// Extraction prompt. Replace: {json_only}, {description}
pub const EXTRACT_PROMPT_TEMPLATE: &str = r#"{json_only}

Read the job posting below and return a JSON object with this EXACT schema:
{
  "company_name": "Acme Corp",
  "job_title": "Backend Engineer",
  "extracted_job_description": "Clean Markdown version of the posting"
}

Rules:
- `extracted_job_description` is Markdown with bold keys and bullet points.
  Put exactly ONE space after every colon (e.g. "**Location:** Remote").
- Drop navigation text, cookie banners, unrelated listings and footers.
- If the text is not a job posting, set `extracted_job_description` to a line starting with "Error:".

JOB POSTING:
{description}"#;

/// System prompt for full analysis and regeneration.
pub const ANALYSIS_SYSTEM: &str = "You are an expert resume writer and career coach \
    with deep expertise in ATS optimization and job matching. \
    You produce an honest match score and two complete, styled HTML documents.";

/// Full analysis prompt.
/// Replace: {json_only}, {no_fabrication}, {tone}, {document_rules}, {description}, {resume}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"{json_only}

{no_fabrication}

{tone}

Analyze the candidate's resume against the job posting and return a JSON object with this EXACT schema:
{
  "company_name": "Acme Corp",
  "job_title": "Backend Engineer",
  "extracted_job_description": "Clean Markdown version of the posting",
  "match_score": 82,
  "resume_html": "<!DOCTYPE html><html><head><style>...</style></head><body>...</body></html>",
  "cover_letter_html": "<!DOCTYPE html><html><head><style>...</style></head><body>...</body></html>"
}

`match_score` is an integer from 0 to 100 measuring how well the candidate's EXISTING
qualifications fit the requirements. Do not inflate it.

{document_rules}

JOB POSTING:
{description}

RESUME:
{resume}"#;

/// Regeneration prompt: same contract as analysis, steered by the user.
/// Replace: {json_only}, {no_fabrication}, {tone}, {document_rules}, {company}, {title},
///          {description}, {resume}, {current_cover_letter}, {instruction}
pub const REGENERATION_PROMPT_TEMPLATE: &str = r#"{json_only}

{no_fabrication}

{tone}

Job: {title} at {company}

Regenerate the tailored resume and cover letter for this job and re-calculate the match score.
Return a JSON object with this EXACT schema:
{
  "company_name": "{company}",
  "job_title": "{title}",
  "extracted_job_description": "Clean Markdown version of the posting",
  "match_score": 82,
  "resume_html": "<!DOCTYPE html>...</html>",
  "cover_letter_html": "<!DOCTYPE html>...</html>"
}

Keep the company name as "{company}" and the job title as "{title}".

{document_rules}

JOB POSTING:
{description}

RESUME:
{resume}

CURRENT COVER LETTER:
{current_cover_letter}

USER REQUEST FOR THIS REVISION:
{instruction}"#;

/// Shape rules for both generated documents.
pub const DOCUMENT_RULES: &str = "\
DOCUMENT RULES:
1. Both documents are COMPLETE HTML documents starting with <!DOCTYPE html>, with all styling in a <style> block inside <head>.
2. All visible content lives inside exactly one <body>...</body>.
3. The resume reorders and rephrases the candidate's real experience to fit the role. Never add experience.
4. The cover letter opens with the candidate's name as <h1>, a contact line, then \"Dear Hiring Manager,\". 250-350 words, 3-4 paragraphs.
5. Do not paraphrase the job description back to the employer. Connect the candidate's actual history to the work.";

/// Instruction used when the user regenerates without steering text.
pub const DEFAULT_REGENERATION_INSTRUCTION: &str =
    "No specific request. Produce a fresh, improved version of both documents.";

/// System prompt for cleaning pasted resume text.
pub const CLEAN_RESUME_SYSTEM: &str = "You are an expert resume formatter. \
    Take raw resume text and clean it into a dense, well-structured Markdown document. \
    Keep all information (contact details, experience, education, skills). \
    Do not add any preamble or commentary.";
