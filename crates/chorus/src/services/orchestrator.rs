//! Submission fan-out: one prompt, N personas, independent settlement.
//!
//! The orchestrator reads its inputs once at submission start, allocates
//! the surface, then issues every persona call before awaiting any of
//! them. Each call settles into its own slot in arrival order; a failure
//! or hang in one persona never touches a sibling. Overlapping
//! submissions run as independent fan-outs and the generation counter
//! turns the superseded one's late writes into no-ops.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::domain::{
    AttachedImage, DomainError, Persona, PersonaRegistry, SlotOutcome, SlotStatus,
    SubmissionRequest,
};
use crate::ports::GenerationClient;

use super::surface::SurfaceManager;

/// Terminal summary of one submission cycle, in selection order.
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub generation: u64,
    pub outcomes: Vec<PersonaStatus>,
}

#[derive(Debug, Clone)]
pub struct PersonaStatus {
    pub persona_id: String,
    pub status: SlotStatus,
}

impl SubmissionReport {
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == SlotStatus::Failed)
            .count()
    }
}

/// Drives one submission cycle: validate, allocate, fan out, settle.
pub struct SubmissionOrchestrator<C> {
    registry: PersonaRegistry,
    client: Arc<C>,
    surface: Arc<SurfaceManager>,
    generation: AtomicU64,
}

impl<C: GenerationClient + 'static> SubmissionOrchestrator<C> {
    pub fn new(registry: PersonaRegistry, client: Arc<C>, surface: Arc<SurfaceManager>) -> Self {
        Self {
            registry,
            client,
            surface,
            generation: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &Arc<SurfaceManager> {
        &self.surface
    }

    /// Submits `prompt` to every selected persona concurrently and returns
    /// once all calls have settled. The report carries each persona's
    /// terminal slot status; per-persona failures are not errors here.
    pub async fn submit(
        &self,
        prompt: &str,
        selected: &[String],
        image: Option<AttachedImage>,
    ) -> Result<SubmissionReport, DomainError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(DomainError::Validation("Prompt must not be empty.".into()));
        }
        if selected.is_empty() {
            return Err(DomainError::Validation(
                "Please select at least one persona.".into(),
            ));
        }

        let mut personas: Vec<Persona> = Vec::with_capacity(selected.len());
        for id in selected {
            let persona = self
                .registry
                .get(id)
                .cloned()
                .ok_or_else(|| DomainError::Validation(format!("Unknown persona: {id}")))?;
            if !personas.iter().any(|p| p.id == persona.id) {
                personas.push(persona);
            }
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        // A submission that lost the race to a newer one still fans out
        // (the generation guard voids its writes), but it must not touch
        // the newer submission's slots.
        if self.surface.allocate(generation, &personas) {
            self.surface.activate(&personas[0].id);
        }
        tracing::info!(
            generation,
            personas = personas.len(),
            has_image = image.is_some(),
            "submission started"
        );

        // Issue every call before awaiting any of them.
        let mut calls = JoinSet::new();
        for persona in &personas {
            let client = Arc::clone(&self.client);
            let request = SubmissionRequest {
                prompt: prompt.to_string(),
                persona_name: persona.display_name.clone(),
                image: image.clone(),
            };
            let persona_id = persona.id.clone();
            calls.spawn(async move {
                let result = client.generate(&request).await;
                (persona_id, result)
            });
        }

        let mut settled: HashMap<String, SlotStatus> = HashMap::new();
        while let Some(joined) = calls.join_next().await {
            match joined {
                Ok((persona_id, Ok(text))) => {
                    settled.insert(persona_id.clone(), SlotStatus::Rendered);
                    if !self
                        .surface
                        .update_slot(generation, &persona_id, SlotOutcome::Success(text))
                    {
                        tracing::debug!(persona = %persona_id, "response arrived after reallocation");
                    }
                }
                Ok((persona_id, Err(err))) => {
                    settled.insert(persona_id.clone(), SlotStatus::Failed);
                    tracing::warn!(persona = %persona_id, error = %err, "persona call failed");
                    self.surface.update_slot(
                        generation,
                        &persona_id,
                        SlotOutcome::Failure(err.to_string()),
                    );
                }
                Err(join_err) => {
                    // A panicked call must not take its siblings down; its
                    // own pane keeps the pending indicator.
                    tracing::warn!(error = %join_err, "persona call aborted");
                }
            }
        }

        let outcomes = personas
            .iter()
            .map(|p| PersonaStatus {
                persona_id: p.id.clone(),
                status: settled.get(&p.id).copied().unwrap_or(SlotStatus::Pending),
            })
            .collect();

        tracing::info!(generation, "submission settled");
        Ok(SubmissionReport {
            generation,
            outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MemoryPane, RenderTarget, SurfaceFactory};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct MemoryFactory;

    impl SurfaceFactory for MemoryFactory {
        fn create_pane(&self, _persona: &Persona) -> Arc<dyn RenderTarget> {
            Arc::new(MemoryPane::default())
        }
    }

    struct Rule {
        persona: Option<String>,
        prompt: Option<String>,
        delay: Duration,
        result: Result<String, DomainError>,
    }

    /// Scripted client: first matching rule wins, default is `Ok("ok")`.
    #[derive(Default)]
    struct MockClient {
        rules: Vec<Rule>,
        panic_on: Option<String>,
        requests: Mutex<Vec<SubmissionRequest>>,
    }

    impl MockClient {
        fn on_persona(mut self, persona: &str, result: Result<String, DomainError>) -> Self {
            self.rules.push(Rule {
                persona: Some(persona.to_string()),
                prompt: None,
                delay: Duration::ZERO,
                result,
            });
            self
        }

        fn on_prompt(
            mut self,
            prompt: &str,
            delay: Duration,
            result: Result<String, DomainError>,
        ) -> Self {
            self.rules.push(Rule {
                persona: None,
                prompt: Some(prompt.to_string()),
                delay,
                result,
            });
            self
        }

        fn requests(&self) -> Vec<SubmissionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationClient for MockClient {
        async fn generate(&self, request: &SubmissionRequest) -> Result<String, DomainError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.panic_on.as_deref() == Some(request.persona_name.as_str()) {
                panic!("injected failure");
            }
            let rule = self.rules.iter().find(|r| {
                r.persona.as_deref().map_or(true, |p| p == request.persona_name)
                    && r.prompt.as_deref().map_or(true, |p| p == request.prompt)
            });
            match rule {
                Some(rule) => {
                    if !rule.delay.is_zero() {
                        tokio::time::sleep(rule.delay).await;
                    }
                    rule.result.clone()
                }
                None => Ok("ok".to_string()),
            }
        }
    }

    fn harness(client: MockClient) -> (Arc<MockClient>, SubmissionOrchestrator<MockClient>) {
        let client = Arc::new(client);
        let surface =
            Arc::new(SurfaceManager::new(Arc::new(MemoryFactory)).with_pace(Duration::ZERO));
        let orchestrator = SubmissionOrchestrator::new(
            PersonaRegistry::builtin(),
            Arc::clone(&client),
            surface,
        );
        (client, orchestrator)
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_single_persona_renders_response() {
        let (_, orchestrator) =
            harness(MockClient::default().on_persona("Gemini Pro", Ok("Hi there".into())));

        let report = orchestrator
            .submit("Hello", &ids(&["gemini"]), None)
            .await
            .unwrap();
        orchestrator.surface().finish_reveals().await;

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].status, SlotStatus::Rendered);
        let pane = orchestrator.surface().pane("gemini").unwrap();
        assert_eq!(pane.contents(), "Hi there");
        assert_eq!(
            orchestrator.surface().active_persona().as_deref(),
            Some("gemini")
        );
    }

    #[tokio::test]
    async fn test_one_slot_per_selected_persona() {
        let (_, orchestrator) = harness(MockClient::default());

        orchestrator
            .submit("Hello", &ids(&["claude", "gemini", "deepseek"]), None)
            .await
            .unwrap();

        let slot_ids: Vec<_> = orchestrator
            .surface()
            .statuses()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(slot_ids, ["claude", "gemini", "deepseek"]);
        // First selected persona is the active tab.
        assert_eq!(
            orchestrator.surface().active_persona().as_deref(),
            Some("claude")
        );
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_own_slot() {
        let client = MockClient::default()
            .on_persona("Gemini Pro", Ok("ok".into()))
            .on_persona("Claude", Err(DomainError::Proxy("rate limited".into())));
        let (_, orchestrator) = harness(client);

        let report = orchestrator
            .submit("Hello", &ids(&["gemini", "claude"]), None)
            .await
            .unwrap();
        orchestrator.surface().finish_reveals().await;

        assert_eq!(report.failed_count(), 1);
        let surface = orchestrator.surface();
        assert_eq!(surface.pane("gemini").unwrap().contents(), "ok");
        assert!(surface.pane("claude").unwrap().contents().contains("rate limited"));
        assert_eq!(report.outcomes[0].status, SlotStatus::Rendered);
        assert_eq!(report.outcomes[1].status, SlotStatus::Failed);
    }

    #[tokio::test]
    async fn test_empty_selection_issues_no_calls() {
        let (client, orchestrator) = harness(MockClient::default());

        let err = orchestrator.submit("Hello", &[], None).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(client.requests().is_empty());
        assert!(orchestrator.surface().statuses().is_empty());
    }

    #[tokio::test]
    async fn test_blank_prompt_is_a_noop() {
        let (client, orchestrator) = harness(MockClient::default());

        let err = orchestrator
            .submit("   \n", &ids(&["gemini"]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_persona_is_rejected_before_fanout() {
        let (client, orchestrator) = harness(MockClient::default());

        let err = orchestrator
            .submit("Hello", &ids(&["gemini", "grok"]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_image_is_shared_not_consumed() {
        let (client, orchestrator) = harness(MockClient::default());
        let image = AttachedImage::new("image/png", "aGVsbG8=");

        orchestrator
            .submit("Hello", &ids(&["gemini", "claude"]), Some(image.clone()))
            .await
            .unwrap();

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.image.as_ref() == Some(&image)));
    }

    #[tokio::test]
    async fn test_panicking_call_does_not_abort_siblings() {
        let client = MockClient {
            panic_on: Some("Claude".to_string()),
            ..MockClient::default()
        }
        .on_persona("Gemini Pro", Ok("still here".into()));
        let (_, orchestrator) = harness(client);

        let report = orchestrator
            .submit("Hello", &ids(&["gemini", "claude"]), None)
            .await
            .unwrap();
        orchestrator.surface().finish_reveals().await;

        assert_eq!(
            orchestrator.surface().pane("gemini").unwrap().contents(),
            "still here"
        );
        // The panicked persona never settled.
        assert_eq!(report.outcomes[1].status, SlotStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_submission_cannot_write_into_new_slots() {
        let client = MockClient::default()
            .on_prompt(
                "slow",
                Duration::from_millis(100),
                Ok("stale answer".into()),
            )
            .on_prompt("fast", Duration::ZERO, Ok("fresh answer".into()));
        let (_, orchestrator) = harness(client);
        let orchestrator = Arc::new(orchestrator);

        let first = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.submit("slow", &ids(&["gemini"]), None).await })
        };
        // Let the first submission allocate and fan out.
        tokio::time::sleep(Duration::from_millis(10)).await;

        orchestrator
            .submit("fast", &ids(&["gemini"]), None)
            .await
            .unwrap();
        first.await.unwrap().unwrap();
        orchestrator.surface().finish_reveals().await;

        let pane = orchestrator.surface().pane("gemini").unwrap();
        assert_eq!(pane.contents(), "fresh answer");
    }
}
