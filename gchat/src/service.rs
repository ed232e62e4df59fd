//! Turn commit protocol: optimistic append, ordered fallback, then commit or rollback.

use std::sync::Arc;

use gprovider::{ChainSet, FallbackExecutor, Role, Turn};

use crate::{ChatError, ChatTurnRequest, ChatTurnResult, ConversationStore};

#[derive(Clone)]
pub struct ChatService {
    executor: FallbackExecutor,
    chains: ChainSet,
    store: Arc<dyn ConversationStore>,
}

impl ChatService {
    pub fn new(
        executor: FallbackExecutor,
        chains: ChainSet,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            executor,
            chains,
            store,
        }
    }

    pub fn chains(&self) -> &ChainSet {
        &self.chains
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    /// Runs the turn on its own task so that dropping the returned future cannot
    /// interrupt a commit or rollback halfway through.
    pub async fn submit(&self, request: ChatTurnRequest) -> Result<ChatTurnResult, ChatError> {
        let service = self.clone();

        tokio::spawn(async move { service.run_turn(request).await })
            .await
            .map_err(|err| ChatError::internal(format!("chat turn task failed: {err}")))?
    }

    pub async fn run_turn(&self, request: ChatTurnRequest) -> Result<ChatTurnResult, ChatError> {
        validate_parts(&request)?;

        let (chain_kind, chain) = self.chains.select(&request.parts);
        self.executor.ensure_configured(chain)?;

        let session = self.store.session(&request.session_id).await?;
        let mut history = session.lock().await;

        let user_turn = Turn::user(request.parts);
        let evicted = history.append(user_turn.clone());
        let mut turns = history.snapshot();
        if history.capacity() == 0 {
            turns.push(user_turn);
        }

        match self.executor.execute(&turns, chain).await {
            Ok(success) => {
                history.append(Turn::assistant(success.response.text.clone()));
                let attempts = success.attempts();

                Ok(ChatTurnResult {
                    session_id: request.session_id,
                    reply: success.response.text,
                    model: success.target.model,
                    provider: success.target.provider,
                    chain: chain_kind,
                    attempts,
                    usage: success.response.usage,
                })
            }
            Err(failure) => {
                history.revert_append(Role::User, evicted);
                Err(ChatError::from(failure))
            }
        }
    }
}

fn validate_parts(request: &ChatTurnRequest) -> Result<(), ChatError> {
    if request.parts.is_empty() {
        return Err(ChatError::validation("a turn needs a message or an image"));
    }

    for part in &request.parts {
        if part.is_empty() {
            return Err(ChatError::validation("content parts must not be empty"));
        }

        if let gprovider::ContentPart::InlineImage { mime_type, .. } = part
            && !mime_type.starts_with("image/")
        {
            return Err(ChatError::validation(format!(
                "unsupported media type '{mime_type}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use gcommon::SessionId;
    use gprovider::{
        ContentPart, ModelChain, ModelProvider, ModelRequest, ModelResponse, ProviderError,
        ProviderFuture, ProviderId, ProviderRegistry, StopReason, TokenUsage,
    };

    use super::*;
    use crate::{ChatErrorKind, InMemoryConversationStore, persona_preamble};

    /// Answers by model name; any model missing from the script fails with a rate limit.
    struct FakeProvider {
        replies: HashMap<&'static str, Result<&'static str, ProviderError>>,
        requests: Mutex<Vec<ModelRequest>>,
    }

    impl FakeProvider {
        fn new(replies: Vec<(&'static str, Result<&'static str, ProviderError>)>) -> Self {
            Self {
                replies: replies.into_iter().collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<ModelRequest> {
            self.requests.lock().expect("requests lock").clone()
        }
    }

    impl ModelProvider for FakeProvider {
        fn id(&self) -> ProviderId {
            ProviderId::Gemini
        }

        fn complete<'a>(
            &'a self,
            request: ModelRequest,
        ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
            Box::pin(async move {
                self.requests
                    .lock()
                    .expect("requests lock")
                    .push(request.clone());

                let reply = self
                    .replies
                    .get(request.model.as_str())
                    .cloned()
                    .unwrap_or_else(|| Err(ProviderError::rate_limited("quota")))?;

                Ok(ModelResponse {
                    provider: ProviderId::Gemini,
                    model: request.model,
                    text: reply.to_string(),
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage {
                        input_tokens: 3,
                        output_tokens: 2,
                        total_tokens: 5,
                    },
                })
            })
        }
    }

    fn service_with(
        provider: Arc<FakeProvider>,
        capacity: usize,
    ) -> (ChatService, Arc<InMemoryConversationStore>) {
        let mut registry = ProviderRegistry::new();
        registry.register_shared(provider);

        let chains = ChainSet::new(
            ModelChain::parse("gemini:text-a,gemini:text-b").expect("text chain"),
            ModelChain::parse("gemini:vision-a").expect("vision chain"),
        )
        .expect("disjoint chains");
        let store = Arc::new(InMemoryConversationStore::new(
            persona_preamble("persona", None),
            capacity,
        ));

        let service = ChatService::new(FallbackExecutor::new(registry), chains, store.clone());
        (service, store)
    }

    async fn rolling_len(store: &InMemoryConversationStore, session: &str) -> usize {
        let session = store
            .session(&SessionId::from(session))
            .await
            .expect("session");
        session.lock().await.len()
    }

    #[tokio::test]
    async fn successful_turn_commits_user_and_assistant() {
        let provider = Arc::new(FakeProvider::new(vec![("text-a", Ok("hello"))]));
        let (service, store) = service_with(provider.clone(), 40);

        let result = service
            .run_turn(ChatTurnRequest::text("s1", "hi"))
            .await
            .expect("turn should succeed");

        assert_eq!(result.reply, "hello");
        assert_eq!(result.model, "text-a");
        assert_eq!(result.attempts, 1);
        assert_eq!(result.usage.total_tokens, 5);
        assert_eq!(rolling_len(&store, "s1").await, 2);

        let requests = provider.requests();
        assert_eq!(
            requests[0].turns,
            [Turn::system("persona"), Turn::user_text("hi")]
        );
    }

    #[tokio::test]
    async fn window_length_is_bounded_after_many_commits() {
        let provider = Arc::new(FakeProvider::new(vec![("text-a", Ok("ok"))]));
        let (service, store) = service_with(provider, 5);

        for index in 0..4 {
            service
                .run_turn(ChatTurnRequest::text("s1", format!("message {index}")))
                .await
                .expect("turn should succeed");
        }

        assert_eq!(rolling_len(&store, "s1").await, 5);
    }

    #[tokio::test]
    async fn exhausted_chain_rolls_back_the_user_turn() {
        let provider = Arc::new(FakeProvider::new(vec![("text-a", Ok("first"))]));
        let (service, store) = service_with(provider, 2);
        service
            .run_turn(ChatTurnRequest::text("s1", "hi"))
            .await
            .expect("first turn should succeed");

        let session = store.session(&SessionId::from("s1")).await.expect("session");
        let before = session.lock().await.clone();

        // Only text-a answers; the vision chain rate limits.
        let error = service
            .run_turn(ChatTurnRequest::new(
                "s1",
                vec![ContentPart::image("image/png", vec![1, 2])],
            ))
            .await
            .expect_err("vision chain should exhaust");

        assert_eq!(error.kind, ChatErrorKind::ChainExhausted { timed_out: false });
        assert_eq!(*session.lock().await, before);
    }

    #[tokio::test]
    async fn fatal_failure_rolls_back_and_hides_provider_text() {
        let provider = Arc::new(FakeProvider::new(vec![(
            "text-a",
            Err(ProviderError::content_policy("blocked: user said something")),
        )]));
        let (service, store) = service_with(provider.clone(), 4);

        let error = service
            .run_turn(ChatTurnRequest::text("s1", "something"))
            .await
            .expect_err("fatal failure should surface");

        assert_eq!(error.kind, ChatErrorKind::FatalProvider);
        assert!(!error.message.contains("something"));
        assert_eq!(rolling_len(&store, "s1").await, 0);
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn validation_failures_never_touch_history() {
        let provider = Arc::new(FakeProvider::new(vec![("text-a", Ok("ok"))]));
        let (service, store) = service_with(provider.clone(), 4);

        for request in [
            ChatTurnRequest::new("s1", Vec::new()),
            ChatTurnRequest::text("s1", "   "),
            ChatTurnRequest::new("s1", vec![ContentPart::image("image/jpeg", Vec::new())]),
            ChatTurnRequest::new("s1", vec![ContentPart::image("text/plain", vec![1])]),
        ] {
            let error = service.run_turn(request).await.expect_err("invalid input");
            assert_eq!(error.kind, ChatErrorKind::Validation);
        }

        assert!(provider.requests().is_empty());
        assert_eq!(store.session_count().expect("count"), 0);
    }

    #[tokio::test]
    async fn unconfigured_provider_is_reported_before_mutation() {
        let provider = Arc::new(FakeProvider::new(vec![("text-a", Ok("ok"))]));
        let mut registry = ProviderRegistry::new();
        registry.register_shared(provider.clone());
        let chains = ChainSet::new(
            ModelChain::parse("openai:gpt-4o-mini").expect("text chain"),
            ModelChain::parse("gemini:vision-a").expect("vision chain"),
        )
        .expect("disjoint chains");
        let store = Arc::new(InMemoryConversationStore::new(Vec::new(), 4));
        let service = ChatService::new(FallbackExecutor::new(registry), chains, store.clone());

        let error = service
            .run_turn(ChatTurnRequest::text("s1", "hi"))
            .await
            .expect_err("openai is not registered");

        assert_eq!(error.kind, ChatErrorKind::ProviderNotConfigured);
        assert_eq!(store.session_count().expect("count"), 0);
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn chain_with_one_unconfigured_fallback_still_answers() {
        let provider = Arc::new(FakeProvider::new(vec![("text-a", Ok("from gemini"))]));
        let mut registry = ProviderRegistry::new();
        registry.register_shared(provider.clone());
        let chains = ChainSet::new(
            ModelChain::parse("gemini:text-a,openai:gpt-4o-mini").expect("text chain"),
            ModelChain::parse("gemini:vision-a").expect("vision chain"),
        )
        .expect("disjoint chains");
        let store = Arc::new(InMemoryConversationStore::new(Vec::new(), 4));
        let service = ChatService::new(FallbackExecutor::new(registry), chains, store.clone());

        let result = service
            .run_turn(ChatTurnRequest::text("s1", "hi"))
            .await
            .expect("gemini entry should answer");

        assert_eq!(result.reply, "from gemini");
        assert_eq!(result.model, "text-a");
        assert_eq!(provider.requests().len(), 1);
        assert_eq!(rolling_len(&store, "s1").await, 2);
    }

    #[tokio::test]
    async fn image_turns_use_the_vision_chain() {
        let provider = Arc::new(FakeProvider::new(vec![
            ("text-a", Ok("text reply")),
            ("vision-a", Ok("vision reply")),
        ]));
        let (service, _store) = service_with(provider, 4);

        let result = service
            .run_turn(
                ChatTurnRequest::text("s1", "what is this?")
                    .with_part(ContentPart::image("image/jpeg", vec![0xff, 0xd8])),
            )
            .await
            .expect("vision turn");

        assert_eq!(result.chain, gprovider::ChainKind::Vision);
        assert_eq!(result.model, "vision-a");
    }

    #[tokio::test]
    async fn zero_capacity_still_sends_the_current_turn() {
        let provider = Arc::new(FakeProvider::new(vec![("text-a", Ok("ok"))]));
        let (service, store) = service_with(provider.clone(), 0);

        service
            .run_turn(ChatTurnRequest::text("s1", "hi"))
            .await
            .expect("turn should succeed");

        assert_eq!(rolling_len(&store, "s1").await, 0);
        assert_eq!(
            provider.requests()[0].turns,
            [Turn::system("persona"), Turn::user_text("hi")]
        );
    }

    #[tokio::test]
    async fn submit_runs_the_turn_on_a_spawned_task() {
        let provider = Arc::new(FakeProvider::new(vec![
            ("text-a", Err(ProviderError::unavailable("busy"))),
            ("text-b", Ok("from b")),
        ]));
        let (service, _store) = service_with(provider, 4);

        let result = service
            .submit(ChatTurnRequest::text("s1", "hi"))
            .await
            .expect("turn should succeed");

        assert_eq!(result.model, "text-b");
        assert_eq!(result.attempts, 2);
        assert_eq!(result.session_id, SessionId::from("s1"));
    }
}
