pub const RULES_SYSTEM_PROMPT: &str = "You are an expert software engineer who writes concise, \
actionable coding rules for a repository. Use the provided documentation context when it is \
relevant. Answer in Markdown with short sections and bullet points. Do not invent APIs that are \
not supported by the context or by widely known conventions.";

/// Stands in for the context section when retrieval finds nothing
pub const NO_CONTEXT_MARKER: &str = "No relevant documentation context found.";

pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

pub fn user_prompt(context: &str, query: &str) -> String {
    format!("Documentation context:\n{context}\n\nRequest:\n{query}")
}
