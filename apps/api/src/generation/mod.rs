// Generation: the AI capability (analyzer), the orchestrator that validates its
// output, and the per-job locks that serialize regeneration with manual saves.
// All LLM calls go through llm_client.

pub mod analyzer;
pub mod locks;
pub mod orchestrator;
pub mod prompts;
