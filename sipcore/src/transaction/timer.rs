//! RFC 3261 Table 4 timer values.

use std::time::Duration;

/// Estimated round-trip time (RTT) for message exchanges.
pub const T1: Duration = Duration::from_millis(500);

/// Maximum retransmission interval for non-INVITE requests and INVITE responses.
pub const T2: Duration = Duration::from_secs(4);

/// Maximum duration that a message may remain in the network before being discarded.
pub const T4: Duration = Duration::from_secs(5);

const TIMER_C: Duration = Duration::from_secs(3 * 60);
const TIMER_D: Duration = Duration::from_secs(32);

/// The timer set of a transaction, derived from T1.
///
/// Timers that only matter for unreliable transports take a `reliable`
/// flag and are zero when it is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timers {
    t1: Duration,
}

impl Timers {
    /// Builds the timer set from `t1`; a zero value falls back to 500 ms.
    ///
    /// ```
    /// # use std::time::Duration;
    /// # use sipcore::transaction::Timers;
    /// let timers = Timers::new(Duration::from_millis(10));
    ///
    /// assert_eq!(timers.a(), Duration::from_millis(10));
    /// assert_eq!(timers.b(), Duration::from_millis(640));
    /// ```
    pub fn new(t1: Duration) -> Self {
        let t1 = if t1.is_zero() { T1 } else { t1 };
        Self { t1 }
    }

    pub fn t1(&self) -> Duration {
        self.t1
    }

    pub fn t2(&self) -> Duration {
        T2
    }

    pub fn t4(&self) -> Duration {
        T4
    }

    /// INVITE request retransmit interval, initial value.
    pub fn a(&self) -> Duration {
        self.t1
    }

    /// INVITE transaction timeout.
    pub fn b(&self) -> Duration {
        64 * self.t1
    }

    /// Proxy INVITE transaction timeout.
    pub fn c(&self) -> Duration {
        TIMER_C
    }

    /// Wait time for response retransmits.
    pub fn d(&self, reliable: bool) -> Duration {
        if reliable {
            Duration::ZERO
        } else {
            TIMER_D
        }
    }

    /// non-INVITE request retransmit interval, initial value.
    pub fn e(&self) -> Duration {
        self.t1
    }

    /// non-INVITE transaction timeout.
    pub fn f(&self) -> Duration {
        64 * self.t1
    }

    /// INVITE response retransmit interval, initial value.
    pub fn g(&self) -> Duration {
        self.t1
    }

    /// Wait time for ACK receipt.
    pub fn h(&self) -> Duration {
        64 * self.t1
    }

    /// Wait time for ACK retransmits.
    pub fn i(&self, reliable: bool) -> Duration {
        if reliable {
            Duration::ZERO
        } else {
            T4
        }
    }

    /// Wait time for non-INVITE request retransmits.
    pub fn j(&self, reliable: bool) -> Duration {
        if reliable {
            Duration::ZERO
        } else {
            64 * self.t1
        }
    }

    /// Wait time for response retransmits.
    pub fn k(&self, reliable: bool) -> Duration {
        if reliable {
            Duration::ZERO
        } else {
            T4
        }
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self::new(T1)
    }
}
