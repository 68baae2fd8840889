use chrono::{DateTime, SubsecRound, Utc};

/// Time source for `watched_at` stamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    // Stored timestamps are epoch milliseconds; truncate so the state handed
    // back to callers equals what a later read returns.
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}
