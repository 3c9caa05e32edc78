//! Lazily fetched, process-wide secrets.
//!
//! Each secret is fetched at most once while a fetch is in flight: every
//! caller that arrives before it resolves awaits the same future. A
//! successful value is kept for the life of the process. A failure is handed
//! to every waiter and then forgotten, so the next access fetches again.

pub mod source;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::error::SecretError;
pub use source::{ParameterSource, SsmParameterSource, StaticParameterSource};

/// Immutable secret bytes. Cheap to clone, never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Arc<[u8]>);

impl Secret {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Secret {
    fn from(value: Vec<u8>) -> Self {
        Secret(value.into())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    AppPrivateKey,
    WebhookSharedSecret,
}

type SharedFetch = Shared<BoxFuture<'static, Result<Secret, SecretError>>>;

enum SlotState {
    Empty,
    Fetching { generation: u64, fetch: SharedFetch },
    Ready(Secret),
}

struct Slot {
    parameter: String,
    state: Mutex<SlotState>,
    generation: AtomicU64,
}

impl Slot {
    fn new(parameter: String) -> Self {
        Self {
            parameter,
            state: Mutex::new(SlotState::Empty),
            generation: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }
}

pub struct SecretStore {
    source: Arc<dyn ParameterSource>,
    private_key: Slot,
    webhook_secret: Slot,
}

impl SecretStore {
    pub fn new(
        source: Arc<dyn ParameterSource>,
        certificate_param: impl Into<String>,
        secret_param: impl Into<String>,
    ) -> Self {
        Self {
            source,
            private_key: Slot::new(certificate_param.into()),
            webhook_secret: Slot::new(secret_param.into()),
        }
    }

    pub async fn get(&self, kind: SecretKind) -> Result<Secret, SecretError> {
        let slot = match kind {
            SecretKind::AppPrivateKey => &self.private_key,
            SecretKind::WebhookSharedSecret => &self.webhook_secret,
        };

        let (generation, fetch) = {
            let mut state = slot.lock();
            match &*state {
                SlotState::Ready(secret) => return Ok(secret.clone()),
                SlotState::Fetching { generation, fetch } => (*generation, fetch.clone()),
                SlotState::Empty => {
                    let generation = slot.next_generation();
                    let fetch = self.start_fetch(&slot.parameter);
                    *state = SlotState::Fetching {
                        generation,
                        fetch: fetch.clone(),
                    };
                    (generation, fetch)
                }
            }
        };

        let result = fetch.await;

        let mut state = slot.lock();
        if let SlotState::Fetching {
            generation: current,
            ..
        } = &*state
        {
            if *current == generation {
                *state = match &result {
                    Ok(secret) => SlotState::Ready(secret.clone()),
                    Err(_) => SlotState::Empty,
                };
            }
        }

        result
    }

    /// Requests both secrets once so the first webhook does not pay for the
    /// round trip. Failures are logged and retried on demand.
    pub async fn warm_up(&self) {
        let (key, secret) = futures::join!(
            self.get(SecretKind::AppPrivateKey),
            self.get(SecretKind::WebhookSharedSecret)
        );
        for (kind, result) in [
            (SecretKind::AppPrivateKey, key.map(drop)),
            (SecretKind::WebhookSharedSecret, secret.map(drop)),
        ] {
            match result {
                Ok(()) => debug!(?kind, "secret loaded"),
                Err(e) => warn!(?kind, error = %e, "secret warm-up failed, will retry on demand"),
            }
        }
    }

    fn start_fetch(&self, parameter: &str) -> SharedFetch {
        let source = Arc::clone(&self.source);
        let parameter = parameter.to_string();
        async move {
            debug!(parameter = %parameter, "fetching secret");
            source.fetch(&parameter).await.map(Secret::from)
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Counts fetches; fails the first `failures` of them.
    struct CountingSource {
        calls: AtomicUsize,
        failures: usize,
        delay: Duration,
    }

    impl CountingSource {
        fn new(failures: usize, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                failures,
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ParameterSource for CountingSource {
        async fn fetch(&self, name: &str) -> Result<Vec<u8>, SecretError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if call < self.failures {
                return Err(SecretError::Fetch {
                    name: name.to_string(),
                    message: "throttled".to_string(),
                });
            }
            Ok(format!("value-of-{name}").into_bytes())
        }
    }

    #[tokio::test]
    async fn concurrent_first_access_shares_one_fetch() {
        let source = CountingSource::new(0, Duration::from_millis(20));
        let store = Arc::new(SecretStore::new(source.clone(), "cert", "secret"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.get(SecretKind::WebhookSharedSecret).await })
            })
            .collect();

        for handle in handles {
            let secret = handle.await.unwrap().unwrap();
            assert_eq!(secret.as_bytes(), b"value-of-secret");
        }
        assert_eq!(source.calls(), 1);

        store.get(SecretKind::WebhookSharedSecret).await.unwrap();
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn failure_reaches_all_waiters_and_is_not_cached() {
        let source = CountingSource::new(1, Duration::from_millis(20));
        let store = SecretStore::new(source.clone(), "cert", "secret");

        let (a, b) = tokio::join!(
            store.get(SecretKind::AppPrivateKey),
            store.get(SecretKind::AppPrivateKey)
        );
        assert!(matches!(a, Err(SecretError::Fetch { .. })));
        assert!(matches!(b, Err(SecretError::Fetch { .. })));
        assert_eq!(source.calls(), 1);

        let secret = store.get(SecretKind::AppPrivateKey).await.unwrap();
        assert_eq!(secret.as_bytes(), b"value-of-cert");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn slots_are_independent() {
        let source = StaticParameterSource::new().with("cert", "pem").with("secret", "hmac");
        let store = SecretStore::new(Arc::new(source), "cert", "secret");

        store.warm_up().await;

        assert_eq!(
            store.get(SecretKind::AppPrivateKey).await.unwrap().as_bytes(),
            b"pem"
        );
        assert_eq!(
            store.get(SecretKind::WebhookSharedSecret).await.unwrap().as_bytes(),
            b"hmac"
        );
    }

    #[test]
    fn debug_output_is_redacted() {
        let secret = Secret::from(b"hunter2".to_vec());
        assert_eq!(format!("{secret:?}"), "Secret(<redacted>)");
    }
}
