//! Timeouts and cooperative cancellation for relay calls.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;

use crate::error::{CalResult, CalendarError};

/// Receiving side of a cancellation signal. Cheap to clone; every clone
/// observes the same `Canceller`.
#[derive(Debug, Clone)]
pub struct Cancellation(watch::Receiver<bool>);

/// Sending side. Dropping it without calling `cancel` never cancels.
#[derive(Debug)]
pub struct Canceller(watch::Sender<bool>);

impl Cancellation {
    pub fn pair() -> (Canceller, Cancellation) {
        let (tx, rx) = watch::channel(false);
        (Canceller(tx), Cancellation(rx))
    }

    /// A signal that never fires.
    pub fn never() -> Cancellation {
        Cancellation::pair().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once cancelled; pends forever if the canceller is gone.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Cancellation::never()
    }
}

impl Canceller {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Run a relay call under a deadline, aborting early on cancellation.
///
/// The in-flight future is dropped either way; nothing partial is returned.
pub async fn bounded<T, F>(call: F, limit: Duration, cancel: &Cancellation) -> CalResult<T>
where
    F: Future<Output = CalResult<T>>,
{
    let mut cancel = cancel.clone();
    if cancel.is_cancelled() {
        return Err(CalendarError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CalendarError::Cancelled),
        result = timeout(limit, call) => {
            result.map_err(|_| CalendarError::QueryTimeout(limit.as_secs()))?
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        };
        let result = bounded(slow, Duration::from_secs(5), &Cancellation::never()).await;
        assert!(matches!(result, Err(CalendarError::QueryTimeout(5))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_aborts() {
        let (canceller, cancel) = Cancellation::pair();
        let slow = async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Ok(1)
        };

        let call = bounded(slow, Duration::from_secs(5), &cancel);
        let trigger = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        };
        let (result, ()) = tokio::join!(call, trigger);
        assert!(matches!(result, Err(CalendarError::Cancelled)));
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_call() {
        let (canceller, cancel) = Cancellation::pair();
        canceller.cancel();
        let result = bounded(async { Ok(1) }, Duration::from_secs(5), &cancel).await;
        assert!(matches!(result, Err(CalendarError::Cancelled)));
    }

    #[tokio::test]
    async fn test_passes_through_result() {
        let result = bounded(async { Ok(7) }, Duration::from_secs(5), &Cancellation::never()).await;
        assert_eq!(result.unwrap(), 7);

        let failing = bounded(
            async { Err::<(), _>(CalendarError::Relay("boom".into())) },
            Duration::from_secs(5),
            &Cancellation::never(),
        )
        .await;
        assert!(matches!(failing, Err(CalendarError::Relay(_))));
    }
}
