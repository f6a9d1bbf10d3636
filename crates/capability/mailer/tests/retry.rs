use shelf_mailer::{MailError, deliver_with_retry};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

#[tokio::test]
async fn retry_stops_after_max_attempts_with_last_error() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let err = deliver_with_retry(3, Duration::from_millis(1), move |attempt| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Err(MailError::Transport(format!("attempt {attempt} refused"))) }
    })
    .await
    .expect_err("all attempts fail");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(matches!(err, MailError::Transport(message) if message == "attempt 3 refused"));
}

#[tokio::test]
async fn retry_returns_on_first_success() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    deliver_with_retry(3, Duration::ZERO, move |attempt| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt < 2 {
                Err(MailError::Transport("busy".to_string()))
            } else {
                Ok(())
            }
        }
    })
    .await
    .expect("second attempt succeeds");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn zero_attempts_still_tries_once() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let _ = deliver_with_retry(0, Duration::ZERO, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Err(MailError::Transport("down".to_string())) }
    })
    .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
