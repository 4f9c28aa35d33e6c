use tokio::sync::watch;

/// Cooperative cancellation signal shared across a worker pool (§5). Workers
/// check `is_cancelled()` between fetches rather than being forcibly aborted,
/// so an in-flight fetch always finishes leaving the database in a
/// consistent state.
#[derive(Clone)]
pub struct CancellationToken {
    receiver: watch::Receiver<bool>,
}

pub struct CancellationSource {
    sender: watch::Sender<bool>,
}

pub fn cancellation_pair() -> (CancellationSource, CancellationToken) {
    let (sender, receiver) = watch::channel(false);
    (CancellationSource { sender }, CancellationToken { receiver })
}

impl CancellationSource {
    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_observed_by_every_clone() {
        let (source, token) = cancellation_pair();
        let cloned = token.clone();
        assert!(!token.is_cancelled());
        source.cancel();
        assert!(token.is_cancelled());
        assert!(cloned.is_cancelled());
    }
}
