/*!
 * Mock language model for testing.
 *
 * This module provides a scripted stand-in for the external service:
 * - `MockProvider::working()` - Echoes `[ID:n]` payload lines back, tagged
 * - `MockProvider::replying(..)` - Always returns the same text
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::empty()` - Always returns an empty reply
 *
 * Every request is recorded so tests can assert on what was (or was not) sent.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::translation::core::{CompletionRequest, LanguageModel};

type Responder = Arc<dyn Fn(&CompletionRequest) -> String + Send + Sync>;

/// Behavior mode for the mock provider
#[derive(Clone)]
pub enum MockBehavior {
    /// Succeeds; the reply comes from the responder
    Working(Responder),
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Simulates slow response (for cancellation testing)
    Slow { delay_ms: u64 },
}

impl fmt::Debug for MockBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Working(_) => write!(f, "Working"),
            Self::Intermittent { fail_every } => write!(f, "Intermittent({})", fail_every),
            Self::Failing => write!(f, "Failing"),
            Self::Empty => write!(f, "Empty"),
            Self::Slow { delay_ms } => write!(f, "Slow({}ms)", delay_ms),
        }
    }
}

/// Mock provider for testing code behind the `LanguageModel` boundary
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, shared between clones
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mock that answers translation payloads with `[ID:n] [TRANSLATED] text`
    pub fn working() -> Self {
        Self::with_responder(|request| Self::echo_translation(&request.prompt))
    }

    /// Mock that computes each reply from the request
    pub fn with_responder(responder: impl Fn(&CompletionRequest) -> String + Send + Sync + 'static) -> Self {
        Self::new(MockBehavior::Working(Arc::new(responder)))
    }

    /// Mock that always replies with the same text
    pub fn replying(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::with_responder(move |_| reply.clone())
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that waits before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// Tag every `[ID:n]` line of a prompt as translated
    pub fn echo_translation(prompt: &str) -> String {
        prompt
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("[ID:"))
            .map(|line| match line.split_once("] ") {
                Some((prefix, text)) => format!("{}] [TRANSLATED] {}", prefix, text),
                None => line.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl LanguageModel for MockProvider {
    async fn generate(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match &self.behavior {
            MockBehavior::Working(responder) => Ok(responder(&request)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::echo_translation(&request.prompt))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(Self::echo_translation(&request.prompt))
            }
        }
    }

    fn describe(&self) -> String {
        format!("mock ({:?})", self.behavior)
    }
}
