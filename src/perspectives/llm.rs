//! LLM-backed perspective agent

use crate::llm::LLMClient;
use crate::perspectives::{PerspectiveAgent, PerspectiveRequest};
use crate::types::{EvidenceContext, Result, Role};
use async_trait::async_trait;
use std::fmt::Write;
use std::sync::Arc;

/// Asks a language model to speak as the requested role.
pub struct LlmPerspective {
    client: Arc<dyn LLMClient>,
}

impl LlmPerspective {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    pub fn system_prompt(role: Role) -> &'static str {
        match role {
            Role::White => {
                "You are the facts perspective. Report only verifiable information, data and \
                 statistics relevant to the question. Point out what is unknown. No opinions."
            }
            Role::Red => {
                "You are the emotions perspective. Describe gut reactions, feelings and \
                 intuitions people are likely to have about the question. No justification needed."
            }
            Role::Yellow => {
                "You are the optimism perspective. Identify the benefits, opportunities and \
                 best-case outcomes, with the reasoning that supports them."
            }
            Role::Black => {
                "You are the risk perspective. Identify the risks, weaknesses, failure modes \
                 and reasons for caution."
            }
            Role::Green => {
                "You are the creativity perspective. Build on the other perspectives to propose \
                 new ideas, alternatives and unconventional solutions."
            }
            Role::Blue => {
                "You are the synthesis perspective. Integrate every prior perspective into a \
                 balanced conclusion with clear next steps."
            }
        }
    }

    /// User prompt: the question, then whatever context the role was given.
    pub fn user_prompt(request: &PerspectiveRequest) -> String {
        let mut prompt = format!("Question: {}\n", request.query);

        write_evidence(&mut prompt, &request.evidence);

        if let Some(aggregated) = &request.aggregated {
            prompt.push_str("\nEarlier perspectives:\n");
            for (role, payload) in &aggregated.responses {
                let _ = writeln!(prompt, "[{}] {}", role, payload);
            }
            if !aggregated.failed_roles.is_empty() {
                let failed: Vec<&str> = aggregated.failed_roles.iter().map(Role::as_str).collect();
                let _ = writeln!(prompt, "Unavailable: {}", failed.join(", "));
            }
            if !aggregated.key_themes.is_empty() {
                let _ = writeln!(prompt, "Key themes: {}", aggregated.key_themes.join(", "));
            }
            for reference in &aggregated.cross_references {
                let _ = writeln!(prompt, "- {}", reference);
            }
        }

        if let Some(synthesis) = &request.synthesis {
            prompt.push_str("\nPerspectives to integrate:\n");
            for result in &request.prior_results {
                match result.live_payload() {
                    Some(payload) => {
                        let _ = writeln!(prompt, "[{}] {}", result.role, payload);
                    }
                    None => {
                        let _ = writeln!(prompt, "[{}] (unavailable)", result.role);
                    }
                }
            }
            for (role, insights) in &synthesis.evidence {
                for insight in insights {
                    let _ = writeln!(prompt, "Evidence for {}: {} - {}", role, insight.title, insight.snippet);
                }
            }
            let _ = writeln!(prompt, "\n{}", synthesis.notes);
        }

        prompt
    }
}

fn write_evidence(prompt: &mut String, evidence: &EvidenceContext) {
    if evidence.is_empty() {
        return;
    }
    prompt.push_str("\nSearch evidence:\n");
    for (i, item) in evidence.items().iter().enumerate() {
        let _ = writeln!(prompt, "{}. {} ({})\n   {}", i + 1, item.title, item.url, item.snippet);
    }
}

#[async_trait]
impl PerspectiveAgent for LlmPerspective {
    async fn invoke(&self, request: &PerspectiveRequest) -> Result<String> {
        self.client
            .generate_with_system(Self::system_prompt(request.role), &Self::user_prompt(request))
            .await
    }
}
