mod openai;
mod provider;

pub use openai::OpenAIChat;
pub use provider::CompletionProvider;

#[cfg(test)]
pub use provider::MockCompletionProvider;
