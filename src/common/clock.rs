use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Epoch-millisecond time source. The manual variant lets tests drive
/// logical time instead of sleeping.
#[derive(Debug, Clone)]
pub enum ClockImpl {
    System,
    Manual(Arc<AtomicI64>),
}

impl ClockImpl {
    pub fn manual(start_ms: i64) -> Self {
        ClockImpl::Manual(Arc::new(AtomicI64::new(start_ms)))
    }

    pub fn now_ms(&self) -> i64 {
        match self {
            ClockImpl::System => chrono::Utc::now().timestamp_millis(),
            ClockImpl::Manual(ms) => ms.load(Ordering::SeqCst),
        }
    }

    /// No-op on the system clock.
    pub fn advance_ms(&self, delta: i64) {
        if let ClockImpl::Manual(ms) = self {
            ms.fetch_add(delta, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_deterministically() {
        let clock = ClockImpl::manual(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        clock.advance_ms(30_000);
        assert_eq!(clock.now_ms(), 31_000);
    }
}
