//! Ad Gateway - single entry point for all generative calls
//!
//! The gateway builds the prompt for a call, attaches the matching schema
//! contract, forwards one request to the backend and decodes the reply into
//! typed results. Each call is a single at-most-once round trip; nothing is
//! retried, cached or batched.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::backend::{GeminiBackend, ModelBackend, ModelRequest};
use crate::config::{GatewayConfig, ModelTuning};
use crate::constants::EMPTY_CHAT_REPLY;
use crate::decode;
use crate::error::{GatewayError, ValidationError};
use crate::prompt;
use crate::schema::{self, SchemaContract};
use crate::session::SessionProvider;
use crate::thread::{ConversationThread, ConversationTurn};
use crate::types::{
    AdCopyVariant, Attachment, AudienceBrief, AudienceSegment, CopyBrief, CreativeAnalysis,
    MediaKind,
};

/// Per-call overrides
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Deadline for this call; falls back to the configured default
    pub timeout: Option<Duration>,
    /// Aborts the call when triggered
    pub cancel: Option<CancellationToken>,
    /// Replaces the configured tuning for this call kind
    pub tuning: Option<ModelTuning>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_tuning(mut self, tuning: ModelTuning) -> Self {
        self.tuning = Some(tuning);
        self
    }
}

/// Decrements the in-flight counter when a call finishes, however it ends
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The single entry point for ALL generative operations.
///
/// Host code never talks to a backend directly. Calls take `&self`, so one
/// gateway can serve several concurrent requests; the only shared state is
/// the in-flight counter.
pub struct AdGateway {
    backend: Arc<dyn ModelBackend>,
    config: GatewayConfig,
    session: Option<Arc<dyn SessionProvider>>,
    in_flight: Arc<AtomicUsize>,
}

impl AdGateway {
    /// Create a gateway over a specific backend
    pub fn new(backend: Arc<dyn ModelBackend>, config: GatewayConfig) -> Self {
        Self {
            backend,
            config,
            session: None,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a gateway talking to the Generative Language API
    pub fn gemini(config: GatewayConfig) -> Self {
        let backend = Arc::new(GeminiBackend::from_config(&config));
        Self::new(backend, config)
    }

    /// Refuse calls while `provider` reports no active session
    pub fn with_session(mut self, provider: Arc<dyn SessionProvider>) -> Self {
        self.session = Some(provider);
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Number of calls currently awaiting the backend
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    /// Three audience segments for a product
    pub async fn request_audience_segments(
        &self,
        brief: &AudienceBrief,
        options: &CallOptions,
    ) -> Result<Vec<AudienceSegment>, GatewayError> {
        let request = self.structured_request(
            &schema::AUDIENCE,
            prompt::build_audience_prompt(
                &brief.product_name,
                &brief.product_description,
                &brief.base_demographic,
            ),
            &self.config.tuning.audience,
            options,
        );

        let payload = self.dispatch(&schema::AUDIENCE, request, options).await?;
        let segments = decode::decode_audience(&payload)?;
        log::info!(
            "Generated {} audience segments for '{}'",
            segments.len(),
            brief.product_name
        );
        Ok(segments)
    }

    /// Three ad-copy variations
    pub async fn request_ad_copy_variants(
        &self,
        brief: &CopyBrief,
        options: &CallOptions,
    ) -> Result<Vec<AdCopyVariant>, GatewayError> {
        let request = self.structured_request(
            &schema::COPY,
            prompt::build_copy_prompt(&brief.product_name, &brief.selling_points, &brief.tone),
            &self.config.tuning.copy,
            options,
        );

        let payload = self.dispatch(&schema::COPY, request, options).await?;
        let variants = decode::decode_copy(&payload)?;
        log::info!(
            "Generated {} copy variants for '{}'",
            variants.len(),
            brief.product_name
        );
        Ok(variants)
    }

    /// Score one image or video creative
    ///
    /// The attachment is validated before anything is sent; a rejected
    /// attachment never reaches the backend.
    pub async fn request_creative_analysis(
        &self,
        attachment: &Attachment,
        user_context: Option<&str>,
        options: &CallOptions,
    ) -> Result<CreativeAnalysis, GatewayError> {
        let kind = self.validate_attachment(attachment)?;

        let mut request = self.structured_request(
            &schema::CREATIVE,
            prompt::build_creative_analysis_prompt(kind, user_context),
            &self.config.tuning.creative,
            options,
        );
        request.attachments.push(attachment.clone());

        let payload = self.dispatch(&schema::CREATIVE, request, options).await?;
        let analysis = decode::decode_creative(&payload)?;
        log::info!(
            "Analyzed {} creative: score {}, stop-scroll {}",
            kind.label(),
            analysis.score,
            analysis.stop_scroll_potential
        );
        Ok(analysis)
    }

    /// Send one user message on `thread` and return the assistant reply
    ///
    /// The thread's context, if any, is prepended to the outgoing message
    /// while the thread is fresh. The thread gains the raw user turn and the
    /// reply only when the call succeeds.
    pub async fn send_chat_turn(
        &self,
        thread: &mut ConversationThread,
        user_text: &str,
        options: &CallOptions,
    ) -> Result<ConversationTurn, GatewayError> {
        let outgoing = match thread.context() {
            Some(context) if thread.is_fresh() => {
                prompt::build_contextual_message(context, user_text)
            }
            _ => user_text.to_string(),
        };
        self.chat_exchange(thread, user_text, outgoing, options).await
    }

    /// Like [`send_chat_turn`](Self::send_chat_turn), but always injects
    /// `context` regardless of the thread's state
    pub async fn send_chat_turn_with_context(
        &self,
        thread: &mut ConversationThread,
        user_text: &str,
        context: &str,
        options: &CallOptions,
    ) -> Result<ConversationTurn, GatewayError> {
        let outgoing = prompt::build_contextual_message(context, user_text);
        self.chat_exchange(thread, user_text, outgoing, options).await
    }

    async fn chat_exchange(
        &self,
        thread: &mut ConversationThread,
        user_text: &str,
        outgoing: String,
        options: &CallOptions,
    ) -> Result<ConversationTurn, GatewayError> {
        let request = ModelRequest {
            model: self.config.model.clone(),
            prompt: outgoing,
            system_instruction: Some(prompt::build_chat_system_instruction().to_string()),
            history: thread.to_history_payload(),
            tuning: options
                .tuning
                .clone()
                .unwrap_or_else(|| self.config.tuning.chat.clone()),
            ..ModelRequest::default()
        };

        let reply = self.dispatch(&schema::CHAT, request, options).await?;
        let reply = if reply.trim().is_empty() {
            log::warn!("Empty chat reply, substituting fallback text");
            EMPTY_CHAT_REPLY.to_string()
        } else {
            reply
        };

        let turn = ConversationTurn::assistant(reply);
        thread.append(ConversationTurn::user(user_text));
        thread.append(turn.clone());
        Ok(turn)
    }

    fn structured_request(
        &self,
        contract: &SchemaContract,
        prompt: String,
        tuning: &ModelTuning,
        options: &CallOptions,
    ) -> ModelRequest {
        ModelRequest {
            model: self.config.model.clone(),
            prompt,
            response_schema: contract.response_schema(),
            tuning: options.tuning.clone().unwrap_or_else(|| tuning.clone()),
            ..ModelRequest::default()
        }
    }

    fn validate_attachment(&self, attachment: &Attachment) -> Result<MediaKind, ValidationError> {
        if attachment.is_empty() {
            return Err(ValidationError::EmptyAttachment);
        }
        let size = attachment.len() as u64;
        let limit = self.config.max_attachment_bytes;
        if size > limit {
            return Err(ValidationError::AttachmentTooLarge { size, limit });
        }
        attachment
            .kind()
            .ok_or_else(|| ValidationError::UnsupportedMediaType(attachment.mime_type.clone()))
    }

    /// Issue one request, honoring the session gate, deadline and cancellation
    async fn dispatch(
        &self,
        contract: &SchemaContract,
        request: ModelRequest,
        options: &CallOptions,
    ) -> Result<String, GatewayError> {
        if let Some(session) = &self.session {
            if !session.is_session_active() {
                log::warn!("Refusing {:?} call: no active session", contract.kind);
                return Err(GatewayError::NoSession);
            }
        }

        let _guard = InFlightGuard::enter(&self.in_flight);
        let deadline = options.timeout.or_else(|| self.config.default_timeout());
        log::debug!(
            "Dispatching {:?} call to {} (model {}, {} prior turns, deadline {:?})",
            contract.kind,
            self.backend.name(),
            request.model,
            request.history.len(),
            deadline
        );

        let call = async {
            let invoke = self.backend.invoke(request);
            match deadline {
                Some(limit) => tokio::time::timeout(limit, invoke)
                    .await
                    .map_err(|_| GatewayError::TimedOut(limit))?
                    .map_err(GatewayError::from),
                None => invoke.await.map_err(GatewayError::from),
            }
        };

        let result = match &options.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(GatewayError::Cancelled),
                    result = call => result,
                }
            }
            None => call.await,
        };

        if let Err(e) = &result {
            log::error!("{:?} call failed: {}", contract.kind, e);
        }
        result
    }
}

/// Shared gateway handle
pub type SharedGateway = Arc<AdGateway>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TransportError;
    use crate::error::DecodeError;
    use crate::session::StaticSession;
    use crate::thread::Role;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records every request it receives
    #[derive(Default)]
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, TransportError>>>,
        requests: Mutex<Vec<ModelRequest>>,
        delay: Option<Duration>,
    }

    impl ScriptedBackend {
        fn replying(replies: Vec<Result<String, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                ..Self::default()
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(VecDeque::from([Ok("late".to_string())])),
                delay: Some(delay),
                ..Self::default()
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_request(&self) -> ModelRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ModelBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn invoke(&self, request: ModelRequest) -> Result<String, TransportError> {
            self.requests.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn gateway(backend: Arc<ScriptedBackend>) -> AdGateway {
        init_logging();
        AdGateway::new(backend, GatewayConfig::default())
    }

    fn segment_json(name: &str, score: f64) -> serde_json::Value {
        json!({
            "segmentName": name,
            "interests": ["Yoga", "Pilates", "Lululemon", "Meditation", "Peloton",
                          "Wellness", "Home workouts"],
            "demographics": "Women 25-40",
            "behaviors": ["Engaged shoppers", "Frequent travelers"],
            "exclusions": ["Gym chains", "Bargain hunters"],
            "reasoning": "High intent for premium fitness gear.",
            "matchScore": score,
            "estimatedReach": "1.2M - 1.5M",
            "personaEmoji": "🧘"
        })
    }

    fn creative_json() -> String {
        json!({
            "score": 72,
            "stopScrollPotential": "Medium",
            "strengths": ["Clear product shot"],
            "weaknesses": ["Weak hook"],
            "improvements": ["Open with motion"],
            "overallFeedback": "Solid, but the first second needs work."
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_audience_segments_end_to_end() {
        let reply = json!([
            segment_json("The Mindful Professional", 92.0),
            segment_json("The Home Gym Builder", 85.0),
            segment_json("The Posture Fixer", 78.0),
        ])
        .to_string();
        let backend = ScriptedBackend::replying(vec![Ok(reply)]);
        let gateway = gateway(backend.clone());

        let brief = AudienceBrief::new(
            "Smart Yoga Mat",
            "Tracks posture and guides sessions",
            "Adults 18-45",
        );
        let segments = gateway
            .request_audience_segments(&brief, &CallOptions::new())
            .await
            .unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].segment_name, "The Mindful Professional");
        assert_eq!(segments[0].match_score, 92);
        assert!(segments.iter().all(|s| s.within_bounds()));

        let request = backend.last_request();
        assert!(request.prompt.contains("Smart Yoga Mat"));
        assert!(request.response_schema.is_some());
        assert!(request.history.is_empty());
        assert!(request.system_instruction.is_none());
        assert_eq!(request.tuning.thinking_budget, Some(2048));
        assert_eq!(request.model, "gemini-2.5-flash");
        assert!(!gateway.is_busy());
    }

    #[tokio::test]
    async fn test_copy_variants_with_tone_and_tuning_override() {
        let variant = json!({
            "angle": "Us vs Them",
            "headline": "Your mat is lazy",
            "primaryText": "Other mats just lie there.",
            "description": "Upgrade today"
        });
        let reply = json!([variant, variant, variant]).to_string();
        let backend = ScriptedBackend::replying(vec![Ok(reply)]);
        let gateway = gateway(backend.clone());

        let brief =
            CopyBrief::new("Smart Yoga Mat", "Posture tracking").with_tone("Witty & Humorous");
        let options = CallOptions::new().with_tuning(ModelTuning {
            temperature: Some(0.2),
            ..ModelTuning::default()
        });
        let variants = gateway
            .request_ad_copy_variants(&brief, &options)
            .await
            .unwrap();

        assert_eq!(variants.len(), 3);
        assert_eq!(variants[0].primary_text, "Other mats just lie there.");
        let request = backend.last_request();
        assert!(request.prompt.contains("Witty & Humorous"));
        assert_eq!(request.tuning.temperature, Some(0.2));
        assert_eq!(request.tuning.thinking_budget, None);
    }

    #[tokio::test]
    async fn test_contract_violation_is_decode_error() {
        let reply = json!([segment_json("Only one", 90.0)]).to_string();
        let backend = ScriptedBackend::replying(vec![Ok(reply)]);
        let gateway = gateway(backend);

        let err = gateway
            .request_audience_segments(&AudienceBrief::new("A", "B", "C"), &CallOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_decode());
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_transport_failure_is_distinct_from_decode() {
        let backend = ScriptedBackend::replying(vec![Err(TransportError::Status {
            status: 503,
            body: "overloaded".into(),
        })]);
        let gateway = gateway(backend);

        let err = gateway
            .request_ad_copy_variants(&CopyBrief::new("A", "B"), &CallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
        assert!(err.is_retryable());
        assert!(!err.is_decode());
    }

    #[tokio::test]
    async fn test_creative_analysis_sends_attachment() {
        let backend = ScriptedBackend::replying(vec![Ok(creative_json())]);
        let gateway = gateway(backend.clone());

        let attachment = Attachment::new("video/mp4", vec![0u8; 64]);
        let analysis = gateway
            .request_creative_analysis(&attachment, Some("Launch teaser"), &CallOptions::new())
            .await
            .unwrap();

        assert_eq!(analysis.score, 72);
        let request = backend.last_request();
        assert_eq!(request.attachments, vec![attachment]);
        assert!(request.prompt.contains("Launch teaser"));
        assert_eq!(request.tuning.thinking_budget, Some(1024));
    }

    #[tokio::test]
    async fn test_invalid_attachments_never_reach_backend() {
        let backend = ScriptedBackend::replying(vec![]);
        let config = GatewayConfig {
            max_attachment_bytes: 16,
            ..GatewayConfig::default()
        };
        let gateway = AdGateway::new(backend.clone(), config);
        let options = CallOptions::new();

        let cases = [
            (
                Attachment::new("image/png", vec![]),
                ValidationError::EmptyAttachment,
            ),
            (
                Attachment::new("image/png", vec![1; 17]),
                ValidationError::AttachmentTooLarge { size: 17, limit: 16 },
            ),
            (
                Attachment::new("application/pdf", vec![1; 4]),
                ValidationError::UnsupportedMediaType("application/pdf".into()),
            ),
        ];
        for (attachment, expected) in cases {
            let err = gateway
                .request_creative_analysis(&attachment, None, &options)
                .await
                .unwrap_err();
            match err {
                GatewayError::Validation(actual) => assert_eq!(actual, expected),
                other => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_attachment_at_size_limit_is_dispatched() {
        let backend = ScriptedBackend::replying(vec![Ok(creative_json())]);
        let config = GatewayConfig {
            max_attachment_bytes: 16,
            ..GatewayConfig::default()
        };
        let gateway = AdGateway::new(backend.clone(), config);

        let attachment = Attachment::new("image/png", vec![1; 16]);
        let analysis = gateway
            .request_creative_analysis(&attachment, None, &CallOptions::new())
            .await
            .unwrap();

        assert_eq!(analysis.score, 72);
        assert_eq!(backend.calls(), 1);
        assert_eq!(backend.last_request().attachments[0].len(), 16);
    }

    #[tokio::test]
    async fn test_chat_injects_context_only_while_fresh() {
        let backend = ScriptedBackend::replying(vec![
            Ok("Try a shorter hook.".into()),
            Ok("Sure, here are three.".into()),
        ]);
        let gateway = gateway(backend.clone());
        let mut thread = ConversationThread::with_context(
            ConversationTurn::assistant("Hi!"),
            "Product: Smart Yoga Mat",
        );

        let reply = gateway
            .send_chat_turn(&mut thread, "Make it punchier", &CallOptions::new())
            .await
            .unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.text, "Try a shorter hook.");

        let first = backend.last_request();
        assert_eq!(
            first.prompt,
            "Context: Product: Smart Yoga Mat\n\nUser Query: Make it punchier"
        );
        assert_eq!(first.history.len(), 1);
        assert_eq!(first.history[0].role, Role::Assistant);
        assert!(first.response_schema.is_none());
        assert!(first.system_instruction.is_some());

        // Stored turn is the raw text, not the injected message
        assert_eq!(thread.len(), 3);
        assert_eq!(thread.turns()[1].text, "Make it punchier");

        gateway
            .send_chat_turn(&mut thread, "Give me more", &CallOptions::new())
            .await
            .unwrap();
        let second = backend.last_request();
        assert_eq!(second.prompt, "Give me more");
        assert_eq!(second.history.len(), 3);
        assert_eq!(thread.len(), 5);
    }

    #[tokio::test]
    async fn test_explicit_context_is_injected_on_any_thread() {
        let backend = ScriptedBackend::replying(vec![Ok("ok".into()), Ok("ok".into())]);
        let gateway = gateway(backend.clone());
        let mut thread = ConversationThread::seeded(ConversationTurn::assistant("Hi!"));

        gateway
            .send_chat_turn(&mut thread, "first", &CallOptions::new())
            .await
            .unwrap();
        gateway
            .send_chat_turn_with_context(&mut thread, "second", "Score: 40", &CallOptions::new())
            .await
            .unwrap();

        assert_eq!(
            backend.last_request().prompt,
            "Context: Score: 40\n\nUser Query: second"
        );
        assert_eq!(thread.turns()[3].text, "second");
    }

    #[tokio::test]
    async fn test_reset_thread_injects_context_again() {
        let backend = ScriptedBackend::replying(vec![Ok("a".into()), Ok("b".into())]);
        let gateway = gateway(backend.clone());
        let seed = ConversationTurn::assistant("Hi!");
        let mut thread = ConversationThread::with_context(seed.clone(), "ctx");

        gateway
            .send_chat_turn(&mut thread, "one", &CallOptions::new())
            .await
            .unwrap();
        thread.reset(seed);
        gateway
            .send_chat_turn(&mut thread, "two", &CallOptions::new())
            .await
            .unwrap();

        let request = backend.last_request();
        assert_eq!(request.prompt, "Context: ctx\n\nUser Query: two");
        assert_eq!(request.history.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_chat_reply_uses_fallback() {
        let backend = ScriptedBackend::replying(vec![Ok("  ".into())]);
        let gateway = gateway(backend);
        let mut thread = ConversationThread::new();

        let reply = gateway
            .send_chat_turn(&mut thread, "hello", &CallOptions::new())
            .await
            .unwrap();
        assert_eq!(reply.text, EMPTY_CHAT_REPLY);
        assert_eq!(thread.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_chat_leaves_thread_untouched() {
        let backend = ScriptedBackend::replying(vec![Err(TransportError::MissingApiKey)]);
        let gateway = gateway(backend);
        let mut thread = ConversationThread::seeded(ConversationTurn::assistant("Hi!"));
        let before = thread.clone();

        let err = gateway
            .send_chat_turn(&mut thread, "hello", &CallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Transport(TransportError::MissingApiKey)
        ));
        assert_eq!(thread, before);
    }

    #[tokio::test]
    async fn test_inactive_session_blocks_calls() {
        let backend = ScriptedBackend::replying(vec![Ok(creative_json())]);
        let session = Arc::new(StaticSession::new(false));
        let gateway = gateway(backend.clone()).with_session(session.clone());
        let attachment = Attachment::new("image/jpeg", vec![1, 2, 3]);

        let err = gateway
            .request_creative_analysis(&attachment, None, &CallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NoSession));
        assert_eq!(backend.calls(), 0);

        session.set_active(true);
        gateway
            .request_creative_analysis(&attachment, None, &CallOptions::new())
            .await
            .unwrap();
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expiry_times_out() {
        let backend = ScriptedBackend::slow(Duration::from_secs(60));
        let gateway = gateway(backend);
        let mut thread = ConversationThread::new();

        let err = gateway
            .send_chat_turn(
                &mut thread,
                "hello",
                &CallOptions::new().with_timeout(Duration::from_secs(5)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::TimedOut(d) if d == Duration::from_secs(5)));
        assert!(err.is_retryable());
        assert!(thread.is_empty());
        assert_eq!(gateway.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_deadline_applies_by_default() {
        let backend = ScriptedBackend::slow(Duration::from_secs(600));
        init_logging();
        let gateway = AdGateway::new(
            backend,
            GatewayConfig {
                request_timeout_secs: 30,
                ..GatewayConfig::default()
            },
        );

        let err = gateway
            .request_ad_copy_variants(&CopyBrief::new("A", "B"), &CallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::TimedOut(d) if d == Duration::from_secs(30)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_aborts_call() {
        let backend = ScriptedBackend::slow(Duration::from_secs(60));
        let gateway = Arc::new(gateway(backend));
        let token = CancellationToken::new();

        let task = {
            let gateway = Arc::clone(&gateway);
            let options = CallOptions::new().with_cancel(token.clone());
            tokio::spawn(async move {
                gateway
                    .request_audience_segments(&AudienceBrief::new("A", "B", "C"), &options)
                    .await
            })
        };

        tokio::task::yield_now().await;
        assert!(gateway.is_busy());
        token.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, GatewayError::Cancelled));
        assert!(!err.is_retryable());
        assert!(!gateway.is_busy());
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_skips_backend() {
        let backend = ScriptedBackend::replying(vec![Ok(creative_json())]);
        let gateway = gateway(backend.clone());
        let token = CancellationToken::new();
        token.cancel();

        let err = gateway
            .request_creative_analysis(
                &Attachment::new("image/png", vec![1]),
                None,
                &CallOptions::new().with_cancel(token),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Cancelled));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_field_reports_item_index() {
        let mut incomplete = segment_json("No reach", 80.0);
        incomplete.as_object_mut().unwrap().remove("estimatedReach");
        let reply = json!([
            segment_json("A", 90.0),
            segment_json("B", 85.0),
            incomplete
        ])
        .to_string();
        let gateway = gateway(ScriptedBackend::replying(vec![Ok(reply)]));

        let err = gateway
            .request_audience_segments(&AudienceBrief::new("A", "B", "C"), &CallOptions::new())
            .await
            .unwrap_err();
        match err {
            GatewayError::Decode(DecodeError::MissingField { field, index }) => {
                assert_eq!(field, "estimatedReach");
                assert_eq!(index, Some(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
