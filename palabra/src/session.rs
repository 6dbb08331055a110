//! Lookup dispatch with superseded-query invalidation.
//!
//! Only the most recently issued lookup is authoritative. Each dispatch gets a
//! monotonically increasing token and aborts the previous in-flight task, so
//! its network work stops promptly instead of merely being ignored. Because an
//! abort can still race an already-sent completion, every surfaced completion
//! must additionally pass the [`Session::is_current`] check before it is
//! rendered.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::error::Error;
use wiktionary_es::Entry;
use wiktionary_es::translations::TranslationBlock;

/// What a finished lookup produced.
#[derive(Debug)]
pub enum Outcome {
    /// A transformed dictionary entry.
    Entry(Box<Entry>),
    /// Translation blocks for the reverse direction.
    Translations(Vec<TranslationBlock>),
}

/// A finished lookup, tagged with the token it was dispatched under.
#[derive(Debug)]
pub struct Completion {
    /// The dispatch token; stale tokens are dropped at the surface.
    pub token: u64,
    /// The query as the user typed it.
    pub query: String,
    /// The lookup's result.
    pub result: Result<Outcome, Error>,
}

/// Session-scoped lookup state: the current-query token and the in-flight
/// task's abort handle.
pub struct Session {
    seq: u64,
    inflight: Option<AbortHandle>,
    tx: mpsc::UnboundedSender<Completion>,
}

impl Session {
    /// Creates a session and the channel its completions arrive on.
    #[must_use]
    pub fn new() -> (Session, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();

        (
            Session {
                seq: 0,
                inflight: None,
                tx,
            },
            rx,
        )
    }

    /// Returns `true` if `token` belongs to the most recent dispatch.
    #[must_use]
    pub const fn is_current(&self, token: u64) -> bool {
        self.seq == token
    }

    /// Dispatches a lookup, invalidating and aborting any previous one, and
    /// returns its token.
    pub fn dispatch<F>(&mut self, query: impl Into<String>, work: F) -> u64
    where
        F: Future<Output = Result<Outcome, Error>> + Send + 'static,
    {
        self.seq += 1;
        let token = self.seq;
        let query = query.into();

        if let Some(previous) = self.inflight.take() {
            debug!(token, "aborting superseded lookup");
            previous.abort();
        }

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let result = work.await;
            // The receiver only goes away on shutdown; a failed send is fine.
            let _ = tx.send(Completion {
                token,
                query,
                result,
            });
        });
        self.inflight = Some(handle.abort_handle());

        token
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn superseded_lookup_produces_no_completion() {
        let (mut session, mut rx) = Session::new();

        let first = session.dispatch("gato", std::future::pending());
        let second = session.dispatch("perro", async { Ok(Outcome::Translations(Vec::new())) });

        let completion = rx.recv().await.expect("one completion");
        assert_eq!(completion.token, second);
        assert_eq!(completion.query, "perro");

        assert!(!session.is_current(first));
        assert!(session.is_current(second));

        // the aborted lookup never surfaces anything
        let nothing = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(nothing.is_err());
    }

    #[tokio::test]
    async fn a_slow_stale_completion_fails_the_current_check() {
        let (mut session, mut rx) = Session::new();

        let first = session.dispatch("a", async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(Outcome::Translations(Vec::new()))
        });
        let second = session.dispatch("b", async { Ok(Outcome::Translations(Vec::new())) });

        // whichever completions arrive, only the second token passes the
        // surface guard
        while let Ok(Some(completion)) =
            tokio::time::timeout(Duration::from_millis(50), rx.recv()).await
        {
            assert_eq!(session.is_current(completion.token), completion.token == second);
        }
        assert!(!session.is_current(first));
    }

    #[tokio::test]
    async fn tokens_increase_monotonically() {
        let (mut session, _rx) = Session::new();

        let a = session.dispatch("a", async { Ok(Outcome::Translations(Vec::new())) });
        let b = session.dispatch("b", async { Ok(Outcome::Translations(Vec::new())) });

        assert!(b > a);
    }
}
