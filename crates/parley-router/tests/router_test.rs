use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use parley_llm::{
    ChatTurn, Credentials, ProviderAdapter, ProviderErrorKind, ProviderRegistry, ProviderReply,
    ProviderRequestError,
};
use parley_router::{CompletionError, CompletionRouter, NO_RESPONSE_SENTINEL};
use parley_types::{Provider, Role};

/// What the scripted adapter does on its next call
enum Step {
    Reply(Option<&'static str>),
    Fail(ProviderErrorKind, Option<u16>),
    Hang(Duration),
}

struct ScriptedAdapter {
    provider: Provider,
    requires_key: bool,
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(Vec<ChatTurn>, u32)>>,
}

impl ScriptedAdapter {
    fn new(provider: Provider, steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            requires_key: false,
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn keyed(provider: Provider, steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            requires_key: true,
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(Vec<ChatTurn>, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn requires_api_key(&self) -> bool {
        self.requires_key
    }

    async fn send(
        &self,
        history: &[ChatTurn],
        _credentials: &Credentials,
        max_reply_tokens: u32,
    ) -> Result<ProviderReply, ProviderRequestError> {
        self.calls
            .lock()
            .unwrap()
            .push((history.to_vec(), max_reply_tokens));
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Step::Reply(Some("default reply")));

        match step {
            Step::Reply(content) => Ok(ProviderReply {
                content: content.map(str::to_string),
                ..ProviderReply::default()
            }),
            Step::Fail(kind, status) => {
                let err = ProviderRequestError::new(self.provider, kind, "scripted failure");
                Err(match status {
                    Some(status) => err.with_status(status),
                    None => err,
                })
            }
            Step::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(ProviderReply::default())
            }
        }
    }
}

fn router_with(adapter: Arc<ScriptedAdapter>) -> CompletionRouter {
    CompletionRouter::builder()
        .registry(ProviderRegistry::new().with(adapter))
        .build()
        .unwrap()
}

fn no_key() -> Credentials {
    Credentials::new()
}

#[tokio::test]
async fn test_successful_turn_appends_user_then_assistant() {
    let adapter = ScriptedAdapter::new(Provider::OpenAI, vec![Step::Reply(Some("hi there"))]);
    let router = router_with(adapter.clone());

    let reply = router.complete("s1", "openai", "hello", &no_key()).await.unwrap();

    let messages = router.list_messages("s1").await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "hello");
    assert_eq!(messages[0].provider, None);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "hi there");
    assert_eq!(messages[1].provider, Some(Provider::OpenAI));
    assert_eq!(messages[1], reply);
}

#[tokio::test]
async fn test_history_includes_new_message_and_router_token_ceiling() {
    let adapter = ScriptedAdapter::new(Provider::Groq, vec![]);
    let router = CompletionRouter::builder()
        .registry(ProviderRegistry::new().with(adapter.clone()))
        .max_reply_tokens(1000)
        .build()
        .unwrap();

    router.complete("s1", "groq", "hello", &no_key()).await.unwrap();

    let calls = adapter.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, vec![ChatTurn::user("hello")]);
    assert_eq!(calls[0].1, 1000);
}

#[tokio::test]
async fn test_second_turn_replays_both_prior_turns() {
    let adapter = ScriptedAdapter::new(
        Provider::OpenAI,
        vec![Step::Reply(Some("first reply")), Step::Reply(Some("second reply"))],
    );
    let router = router_with(adapter.clone());

    router.complete("s1", "openai", "one", &no_key()).await.unwrap();
    router.complete("s1", "openai", "two", &no_key()).await.unwrap();

    let calls = adapter.calls();
    assert_eq!(
        calls[1].0,
        vec![
            ChatTurn::user("one"),
            ChatTurn::assistant("first reply"),
            ChatTurn::user("two"),
        ]
    );
    assert_eq!(router.list_messages("s1").await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_unknown_provider_leaves_transcript_unchanged() {
    let adapter = ScriptedAdapter::new(Provider::OpenAI, vec![]);
    let router = router_with(adapter.clone());
    router.complete("s1", "openai", "hello", &no_key()).await.unwrap();
    let before = router.list_messages("s1").await.unwrap();

    let err = router
        .complete("s1", "not-a-provider", "again", &no_key())
        .await
        .unwrap_err();

    assert!(matches!(err, CompletionError::UnsupportedProvider(ref name) if name == "not-a-provider"));
    assert_eq!(router.list_messages("s1").await.unwrap(), before);
    assert_eq!(adapter.calls().len(), 1);
}

#[tokio::test]
async fn test_known_but_unregistered_provider_is_unsupported() {
    let router = router_with(ScriptedAdapter::new(Provider::OpenAI, vec![]));

    for provider in ["groq", "browser"] {
        let err = router.complete("s1", provider, "hello", &no_key()).await.unwrap_err();
        assert!(matches!(err, CompletionError::UnsupportedProvider(_)));
    }
    assert!(router.list_messages("s1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_provider_failure_keeps_only_user_message() {
    let adapter = ScriptedAdapter::new(
        Provider::OpenAI,
        vec![Step::Fail(ProviderErrorKind::Status, Some(500))],
    );
    let router = router_with(adapter);

    let err = router.complete("s1", "openai", "hello", &no_key()).await.unwrap_err();

    match err {
        CompletionError::ProviderRequest(err) => {
            assert_eq!(err.provider, Provider::OpenAI);
            assert_eq!(err.kind, ProviderErrorKind::Status);
            assert_eq!(err.status, Some(500));
        }
        other => panic!("expected provider error, got {:?}", other),
    }

    let messages = router.list_messages("s1").await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "hello");
}

#[tokio::test]
async fn test_retry_after_failure_replays_attempt_once() {
    let adapter = ScriptedAdapter::new(
        Provider::OpenAI,
        vec![
            Step::Fail(ProviderErrorKind::Unauthorized, Some(401)),
            Step::Reply(Some("finally")),
        ],
    );
    let router = router_with(adapter.clone());

    assert!(router.complete("s1", "openai", "hello", &no_key()).await.is_err());
    router.complete("s1", "openai", "hello", &no_key()).await.unwrap();

    let calls = adapter.calls();
    assert_eq!(calls[1].0, vec![ChatTurn::user("hello"), ChatTurn::user("hello")]);
    let contents: Vec<String> = router
        .list_messages("s1")
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(contents, vec!["hello", "hello", "finally"]);
}

#[tokio::test]
async fn test_missing_content_stores_sentinel() {
    let adapter = ScriptedAdapter::new(
        Provider::Ollama,
        vec![Step::Reply(None), Step::Reply(Some("   "))],
    );
    let router = router_with(adapter);

    let first = router.complete("s1", "ollama", "hello", &no_key()).await.unwrap();
    let second = router.complete("s1", "ollama", "again", &no_key()).await.unwrap();

    assert_eq!(first.content, NO_RESPONSE_SENTINEL);
    assert_eq!(first.content, "No response received");
    assert_eq!(second.content, NO_RESPONSE_SENTINEL);
    assert_eq!(first.provider, Some(Provider::Ollama));
}

#[tokio::test]
async fn test_empty_message_is_rejected_without_calling_provider() {
    let adapter = ScriptedAdapter::new(Provider::OpenAI, vec![]);
    let router = router_with(adapter.clone());

    let err = router.complete("s1", "openai", "  \n", &no_key()).await.unwrap_err();

    assert!(matches!(err, CompletionError::Validation(_)));
    assert!(router.list_messages("s1").await.unwrap().is_empty());
    assert!(adapter.calls().is_empty());
}

#[tokio::test]
async fn test_missing_api_key_is_rejected_before_append() {
    let adapter = ScriptedAdapter::keyed(Provider::Groq, vec![]);
    let router = router_with(adapter.clone());

    let err = router.complete("s1", "groq", "hello", &no_key()).await.unwrap_err();
    assert!(matches!(err, CompletionError::Validation(ref msg) if msg.contains("groq")));
    assert!(router.list_messages("s1").await.unwrap().is_empty());

    router
        .complete("s1", "groq", "hello", &Credentials::api_key("gsk-1"))
        .await
        .unwrap();
    assert_eq!(adapter.calls().len(), 1);
}

#[tokio::test]
async fn test_timeout_is_reported_and_user_message_kept() {
    let adapter = ScriptedAdapter::new(Provider::OpenAI, vec![Step::Hang(Duration::from_secs(5))]);
    let router = CompletionRouter::builder()
        .registry(ProviderRegistry::new().with(adapter))
        .request_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let err = router.complete("s1", "openai", "hello", &no_key()).await.unwrap_err();

    match err {
        CompletionError::ProviderRequest(err) => assert_eq!(err.kind, ProviderErrorKind::Timeout),
        other => panic!("expected timeout, got {:?}", other),
    }
    let messages = router.list_messages("s1").await.unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].is_user());
}

#[tokio::test]
async fn test_clear_session() {
    let router = router_with(ScriptedAdapter::new(Provider::OpenAI, vec![]));
    router.complete("s1", "openai", "hello", &no_key()).await.unwrap();
    router.complete("s2", "openai", "other", &no_key()).await.unwrap();

    router.clear_session("s1").await.unwrap();
    router.clear_session("s1").await.unwrap();
    router.clear_session("unknown").await.unwrap();

    assert!(router.list_messages("s1").await.unwrap().is_empty());
    assert_eq!(router.list_messages("s2").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_ingest_reply_requires_prior_user_message() {
    let router = router_with(ScriptedAdapter::new(Provider::OpenAI, vec![]));

    let err = router.ingest_reply("s1", "browser", "computed locally").await.unwrap_err();
    assert!(matches!(err, CompletionError::Validation(_)));
    assert!(router.list_messages("s1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ingest_reply_after_failed_turn() {
    let adapter = ScriptedAdapter::new(
        Provider::OpenAI,
        vec![Step::Fail(ProviderErrorKind::Network, None)],
    );
    let router = router_with(adapter);
    assert!(router.complete("s1", "openai", "hello", &no_key()).await.is_err());

    let reply = router.ingest_reply("s1", "browser", "computed locally").await.unwrap();

    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.provider, Some(Provider::Browser));
    let messages = router.list_messages("s1").await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1], reply);
}

#[tokio::test]
async fn test_ingest_reply_validates_input() {
    let router = router_with(ScriptedAdapter::new(Provider::OpenAI, vec![]));
    router.complete("s1", "openai", "hello", &no_key()).await.unwrap();

    let err = router.ingest_reply("s1", "browser", " ").await.unwrap_err();
    assert!(matches!(err, CompletionError::Validation(_)));

    let err = router.ingest_reply("s1", "mystery", "text").await.unwrap_err();
    assert!(matches!(err, CompletionError::UnsupportedProvider(_)));

    assert_eq!(router.list_messages("s1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_serialized_sessions_keep_turns_paired() {
    let adapter = ScriptedAdapter::new(Provider::OpenAI, vec![]);
    let router = Arc::new(router_with(adapter.clone()));

    let turns = ["first", "second"].map(|text| {
        let router = router.clone();
        tokio::spawn(async move { router.complete("s1", "openai", text, &Credentials::new()).await })
    });
    for result in futures::future::join_all(turns).await {
        result.unwrap().unwrap();
    }

    let messages = router.list_messages("s1").await.unwrap();
    let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);

    // The second call saw the complete first turn
    let calls = adapter.calls();
    assert_eq!(calls[0].0.len(), 1);
    assert_eq!(calls[1].0.len(), 3);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let router = router_with(ScriptedAdapter::new(Provider::OpenAI, vec![]));

    router.complete("a", "openai", "hello a", &no_key()).await.unwrap();
    router.complete("b", "openai", "hello b", &no_key()).await.unwrap();

    let a = router.list_messages("a").await.unwrap();
    assert_eq!(a.len(), 2);
    assert!(a.iter().all(|m| m.session_id == "a"));
    assert_eq!(router.store().session_count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_clear_during_unserialized_call_discards_reply() {
    let adapter = ScriptedAdapter::new(
        Provider::OpenAI,
        vec![Step::Hang(Duration::from_millis(200))],
    );
    let router = Arc::new(
        CompletionRouter::builder()
            .registry(ProviderRegistry::new().with(adapter))
            .serialize_sessions(false)
            .build()
            .unwrap(),
    );

    let turn = {
        let router = router.clone();
        tokio::spawn(async move { router.complete("s1", "openai", "hello", &no_key()).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    router.clear_session("s1").await.unwrap();

    let err = turn.await.unwrap().unwrap_err();

    assert!(matches!(err, CompletionError::SessionCleared(ref id) if id == "s1"));
    assert!(router.list_messages("s1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_browser_provider_points_to_reply_ingestion() {
    let router = router_with(ScriptedAdapter::new(Provider::OpenAI, vec![]));

    let err = router.complete("s1", "browser", "hello", &no_key()).await.unwrap_err();

    match err {
        CompletionError::UnsupportedProvider(msg) => {
            assert!(msg.starts_with("browser"));
            assert!(msg.contains("client"));
        }
        other => panic!("expected unsupported provider, got {:?}", other),
    }
}
