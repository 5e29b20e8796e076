use std::time::Duration;

use tokio::sync::mpsc;
use tracing::warn;

use crate::error::SubmitError;
use crate::request::Request;

pub type RequestSender = mpsc::Sender<Request>;
pub type RequestReceiver = mpsc::Receiver<Request>;

/// Bounded request queue. A capacity of zero is raised to one.
pub fn request_channel(capacity: usize) -> (RequestSender, RequestReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Enqueue `request`, giving up after `timeout`.
///
/// On timeout or a closed queue the request is dropped, which closes any
/// reply path it carries.
pub async fn send_timeout(
    queue: &RequestSender,
    request: Request,
    timeout: Duration,
) -> Result<(), SubmitError> {
    match tokio::time::timeout(timeout, queue.send(request)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) => Err(SubmitError::Closed),
        Err(_) => Err(SubmitError::Timeout(timeout)),
    }
}

/// Like [`send_timeout`] but only reports whether the request was accepted.
pub async fn try_send(queue: &RequestSender, request: Request, timeout: Duration) -> bool {
    let kind = request.kind();
    match send_timeout(queue, request, timeout).await {
        Ok(()) => true,
        Err(e) => {
            warn!(request = %kind, error = %e, "request not submitted");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepted_when_room() {
        let (tx, mut rx) = request_channel(1);
        let request = Request::set_index("i").unwrap();
        assert!(try_send(&tx, request, Duration::from_millis(50)).await);
        assert_eq!(rx.recv().await.unwrap().index(), Some("i"));
    }

    #[tokio::test]
    async fn times_out_when_full() {
        let (tx, _rx) = request_channel(1);
        tx.send(Request::set_index("a").unwrap()).await.unwrap();

        let (request, pending) = Request::fetch_indexes();
        let err = send_timeout(&tx, request, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::Timeout(Duration::from_millis(20)));
        // The rejected request was dropped with its reply path.
        assert!(pending.recv().await.is_none());
    }

    #[tokio::test]
    async fn closed_queue_is_rejected() {
        let (tx, rx) = request_channel(1);
        drop(rx);
        let request = Request::set_index("i").unwrap();
        let err = send_timeout(&tx, request, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::Closed);
    }

    #[tokio::test]
    async fn zero_capacity_is_raised() {
        let (tx, _rx) = request_channel(0);
        assert_eq!(tx.max_capacity(), 1);
    }
}
