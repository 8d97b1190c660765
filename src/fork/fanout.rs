use std::future::Future;
use tokio::sync::mpsc;
use tracing::{warn, Instrument};

use super::errors::ForkError;

/// Run one task per item concurrently and collect every result.
///
/// The result channel has room for exactly one message per task, so no
/// task ever waits to report. The caller is only released once every
/// task has reported (or panicked), even when an early task failed; the
/// first error received is returned and later ones are logged.
pub(crate) async fn fan_out<I, T, F, Fut>(items: Vec<I>, task: F) -> Result<Vec<T>, ForkError>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, ForkError>> + Send + 'static,
{
    let total = items.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let (sender, mut receiver) = mpsc::channel::<Result<T, ForkError>>(total);
    let mut handles = Vec::with_capacity(total);

    for item in items {
        let sender = sender.clone();
        let work = task(item);
        handles.push(tokio::spawn(
            async move {
                let _ = sender.send(work.await).await;
            }
            .in_current_span(),
        ));
    }
    drop(sender);

    let mut completed = Vec::with_capacity(total);
    let mut first_error = None;

    // Closes once every task has dropped its sender
    while let Some(result) = receiver.recv().await {
        match result {
            Ok(value) => completed.push(value),
            Err(error) if first_error.is_none() => first_error = Some(error),
            Err(error) => warn!(%error, "Additional branch task failure"),
        }
    }

    for handle in handles {
        if let Err(join_error) = handle.await {
            let error = ForkError::TaskFailed(join_error.to_string());
            if first_error.is_none() {
                first_error = Some(error);
            } else {
                warn!(%error, "Additional branch task failure");
            }
        }
    }

    match first_error {
        Some(error) => Err(error),
        None => Ok(completed),
    }
}
