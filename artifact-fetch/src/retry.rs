use anyhow::Result;
use std::io::ErrorKind;
use std::time::Duration;

/// How often a failed request is repeated. The default never retries.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Base delay, multiplied by the attempt number.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(max_retries: u32) -> Self {
        if max_retries == 0 {
            return Self::none();
        }
        Self {
            max_retries,
            delay: Duration::from_secs(1),
        }
    }

    pub fn run<T>(&self, what: &str, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries && is_transient(&err) => {
                    attempt += 1;
                    let delay = self.delay * attempt;
                    tracing::warn!(attempt, ?delay, "{} failed: {:#}", what, err);
                    std::thread::sleep(delay);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Connection failures, timeouts and server errors are worth another try.
/// Anything else is permanent.
pub fn is_transient(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(err) = cause.downcast_ref::<reqwest::Error>() {
            return is_transient_http(err);
        }
        if let Some(err) = cause.downcast_ref::<std::io::Error>() {
            // body reads wrap the reqwest error in an io::Error of kind Other
            if let Some(err) = err.get_ref().and_then(|e| e.downcast_ref::<reqwest::Error>()) {
                return is_transient_http(err);
            }
            return matches!(
                err.kind(),
                ErrorKind::TimedOut
                    | ErrorKind::ConnectionRefused
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::Interrupted
            );
        }
        false
    })
}

fn is_transient_http(err: &reqwest::Error) -> bool {
    err.is_timeout()
        || err.is_connect()
        || err.is_body()
        || err.status().map(|s| s.is_server_error()).unwrap_or(false)
}
