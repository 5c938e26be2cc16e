use std::sync::Arc;

use domain_rag::{RagError, RagOrchestrator};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{RuleError, RuleResult};
use crate::models::{CreateRule, Rule};
use crate::repositories::{Repository, RepositoryService, RepositoryStore};
use crate::repository::RuleRepository;
use crate::service::RuleService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GenerationSource {
    /// LLM output grounded on retrieved documentation
    Rag,
    /// Assembled from repository metadata alone
    Template,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct GenerateRules {
    /// Defaults to "<full name> rules"
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// Extra guidance appended to the generation request
    #[validate(length(max = 4000))]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeneratedRule {
    pub rule: Rule,
    pub source: GenerationSource,
}

/// Generates a rule document for a repository and stores it as a new rule
pub struct RuleGenerator<R: RuleRepository, S: RepositoryStore> {
    rules: RuleService<R>,
    repositories: RepositoryService<S>,
    orchestrator: Option<Arc<RagOrchestrator>>,
}

impl<R: RuleRepository + 'static, S: RepositoryStore> RuleGenerator<R, S> {
    pub fn new(
        rules: RuleService<R>,
        repositories: RepositoryService<S>,
        orchestrator: Option<Arc<RagOrchestrator>>,
    ) -> Self {
        Self {
            rules,
            repositories,
            orchestrator,
        }
    }

    /// Always produces a rule unless the repository is missing or the write fails
    pub async fn generate(
        &self,
        owner: Uuid,
        repository_id: Uuid,
        input: GenerateRules,
    ) -> RuleResult<GeneratedRule> {
        input
            .validate()
            .map_err(|e| RuleError::Validation(e.to_string()))?;

        let repository = self.repositories.get(repository_id, owner).await?;
        let (content, source) = self.content_for(&repository, &input).await?;

        let rule = self
            .rules
            .create(
                owner,
                CreateRule {
                    name: input
                        .name
                        .unwrap_or_else(|| format!("{} rules", repository.full_name)),
                    content,
                    repository_id: Some(repository.id),
                    active: true,
                },
            )
            .await?;

        Ok(GeneratedRule { rule, source })
    }

    async fn content_for(
        &self,
        repository: &Repository,
        input: &GenerateRules,
    ) -> RuleResult<(String, GenerationSource)> {
        let Some(orchestrator) = &self.orchestrator else {
            return Ok((template_rules(repository), GenerationSource::Template));
        };

        let query = generation_query(repository, input.instructions.as_deref());
        match orchestrator
            .generate(&query, repository.user_id, &[repository.id])
            .await
        {
            Ok(text) => Ok((text, GenerationSource::Rag)),
            Err(e @ (RagError::RemoteService(_) | RagError::Generation(_))) => {
                tracing::warn!(
                    repository_id = %repository.id,
                    error = %e,
                    "RAG generation failed, using template"
                );
                Ok((template_rules(repository), GenerationSource::Template))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn generation_query(repository: &Repository, instructions: Option<&str>) -> String {
    let mut query = format!(
        "Write coding rules for the repository {}.",
        repository.full_name
    );
    if !repository.description.is_empty() {
        query.push_str(&format!("\nDescription: {}", repository.description));
    }
    if let Some(language) = &repository.language {
        query.push_str(&format!("\nPrimary language: {language}"));
    }
    if !repository.topics.is_empty() {
        query.push_str(&format!("\nTopics: {}", repository.topics.join(", ")));
    }
    if let Some(instructions) = instructions.filter(|s| !s.trim().is_empty()) {
        query.push_str(&format!("\nAdditional instructions: {instructions}"));
    }
    query
}

/// Rule text built only from repository metadata
pub fn template_rules(repository: &Repository) -> String {
    let mut out = format!("# Coding rules for {}\n", repository.full_name);

    if !repository.description.is_empty() {
        out.push_str(&format!("\n{}\n", repository.description));
    }

    out.push_str("\n## General\n");
    out.push_str("- Keep changes small and focused; one concern per commit.\n");
    out.push_str("- Match the existing code style and naming of surrounding code.\n");
    out.push_str("- Add or update tests alongside every behavior change.\n");

    if let Some(language) = &repository.language {
        out.push_str(&format!("\n## {language}\n"));
        out.push_str(&format!(
            "- Follow idiomatic {language} conventions and the project's formatter and linter settings.\n"
        ));
        out.push_str("- Prefer explicit error handling over silently ignoring failures.\n");
    }

    if !repository.topics.is_empty() {
        out.push_str("\n## Domain\n");
        for topic in &repository.topics {
            out.push_str(&format!("- Keep `{topic}` concerns consistent with existing modules.\n"));
        }
    }

    out.push_str("\n## Workflow\n");
    out.push_str(&format!(
        "- Branch from `{}` and keep it releasable.\n",
        repository.default_branch
    ));
    out
}
