//! Lifecycle-bound actions.
//!
//! A [`Binding`] ties store actions to the lifetime of whatever consumes the
//! store (a screen, a session, a CLI command). Each time its dependency
//! changes it starts the action once, tagged with a fresh [`EpochToken`].
//! Changing the dependency again, or tearing the binding down, moves the
//! epoch forward: responses and live events carrying an older token are
//! discarded instead of written to the store.

use std::fmt::Debug;
use std::future::Future;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Marks the epoch an action was started in.
#[derive(Debug, Clone)]
pub struct EpochToken {
    epoch: u64,
    current: Option<watch::Receiver<u64>>,
}

impl EpochToken {
    /// A token that is never superseded. Actions started with it always
    /// commit.
    pub fn detached() -> Self {
        Self {
            epoch: 0,
            current: None,
        }
    }

    /// Epoch this token was issued for.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether results tagged with this token may still be written.
    pub fn is_current(&self) -> bool {
        match &self.current {
            None => true,
            Some(current) => current.has_changed().is_ok() && *current.borrow() == self.epoch,
        }
    }

    /// Resolves once the token is no longer current. Never resolves for a
    /// detached token.
    pub async fn superseded(&self) {
        let Some(current) = &self.current else {
            return std::future::pending().await;
        };
        let mut current = current.clone();
        let epoch = self.epoch;
        // A closed channel also means the binding is gone
        let _ = current.wait_for(|value| *value != epoch).await;
    }
}

/// Runs an action once per dependency change, for as long as it is mounted.
#[derive(Debug)]
pub struct Binding<D> {
    name: &'static str,
    epoch: watch::Sender<u64>,
    dependency: Option<D>,
    mounted: bool,
    task: Option<JoinHandle<()>>,
}

impl<D> Binding<D>
where
    D: Clone + PartialEq + Debug + Send + 'static,
{
    /// A mounted binding with no dependency value yet.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            epoch: watch::Sender::new(0),
            dependency: None,
            mounted: true,
            task: None,
        }
    }

    /// Report the current dependency value.
    ///
    /// If it differs from the last one, the previous epoch is superseded and
    /// `action` is spawned with a token for the new epoch. Returns whether
    /// the action was started. Does nothing once torn down.
    pub fn update<F, Fut>(&mut self, dependency: D, action: F) -> bool
    where
        F: FnOnce(D, EpochToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if !self.mounted || self.dependency.as_ref() == Some(&dependency) {
            return false;
        }

        let epoch = self.advance();
        tracing::debug!(binding = self.name, epoch, dependency = ?dependency, "Dependency changed");

        self.dependency = Some(dependency.clone());
        let future = action(dependency, self.token());
        self.task = Some(tokio::spawn(future));
        true
    }

    /// Supersede the current epoch permanently.
    pub fn teardown(&mut self) {
        if self.mounted {
            self.mounted = false;
            let epoch = self.advance();
            tracing::debug!(binding = self.name, epoch, "Binding torn down");
        }
    }

    /// Token for the current epoch.
    pub fn token(&self) -> EpochToken {
        let current = self.epoch.subscribe();
        let epoch = *current.borrow();
        EpochToken {
            epoch,
            current: Some(current),
        }
    }

    pub fn epoch(&self) -> u64 {
        *self.epoch.borrow()
    }

    pub fn dependency(&self) -> Option<&D> {
        self.dependency.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Wait for the most recently started action to finish.
    pub async fn settled(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(binding = self.name, error = %e, "Bound action panicked");
            }
        }
    }

    fn advance(&self) -> u64 {
        self.epoch.send_modify(|epoch| *epoch += 1);
        *self.epoch.borrow()
    }
}

impl<D> Drop for Binding<D> {
    fn drop(&mut self) {
        self.epoch.send_modify(|epoch| *epoch += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn detached_is_always_current() {
        let token = EpochToken::detached();
        assert!(token.is_current());
        assert_eq!(token.epoch(), 0);
    }

    #[tokio::test]
    async fn token_carries_current_epoch() {
        let mut binding = Binding::new("test");
        assert_eq!(binding.token().epoch(), 0);

        binding.update("a", |_, _| async {});
        binding.update("b", |_, _| async {});
        let token = binding.token();
        assert_eq!(token.epoch(), 2);
        assert_eq!(token.epoch(), binding.epoch());
        assert!(token.is_current());
    }

    #[tokio::test]
    async fn runs_once_per_transition() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut binding = Binding::new("test");

        for dependency in ["a", "a", "b", "b", "a"] {
            let runs = runs.clone();
            binding.update(dependency, move |_, _| async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
            binding.settled().await;
        }

        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert_eq!(binding.dependency(), Some(&"a"));
        assert_eq!(binding.epoch(), 3);
    }

    #[tokio::test]
    async fn transition_supersedes_previous_token() {
        let mut binding = Binding::new("test");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let sender = tx.clone();
        binding.update(1u32, move |_, token| async move {
            sender.send(token).unwrap();
        });
        let first = rx.recv().await.unwrap();
        assert!(first.is_current());

        binding.update(2u32, move |_, token| async move {
            tx.send(token).unwrap();
        });
        let second = rx.recv().await.unwrap();

        assert!(!first.is_current());
        assert!(second.is_current());
        first.superseded().await;
    }

    #[tokio::test]
    async fn teardown_stops_everything() {
        let mut binding = Binding::<u32>::new("test");
        let token = binding.token();
        assert!(token.is_current());

        binding.teardown();
        assert!(!binding.is_mounted());
        assert!(!token.is_current());
        tokio::time::timeout(Duration::from_secs(1), token.superseded())
            .await
            .unwrap();

        // No more actions after teardown
        assert!(!binding.update(7, |_, _| async {}));
    }

    #[tokio::test]
    async fn drop_supersedes_token() {
        let binding = Binding::<u32>::new("test");
        let token = binding.token();
        drop(binding);

        assert!(!token.is_current());
        tokio::time::timeout(Duration::from_secs(1), token.superseded())
            .await
            .unwrap();
    }
}
