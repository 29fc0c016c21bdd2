use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use ironkrb_asn1::{der, KerberosTime, Microseconds};

/// A point in time with the precision carried by the messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KerberosTimestamp {
    /// Seconds since the UNIX epoch
    pub seconds: i64,
    pub usec: Microseconds,
}

impl KerberosTimestamp {
    pub const fn new(seconds: i64, usec: Microseconds) -> Self {
        Self { seconds, usec }
    }

    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(since_epoch) => Self {
                seconds: i64::try_from(since_epoch.as_secs()).unwrap_or(i64::MAX),
                usec: since_epoch.subsec_micros(),
            },
            // Clocks set before 1970 are not worth more than second precision
            Err(e) => Self {
                seconds: i64::try_from(e.duration().as_secs()).map_or(i64::MIN, |seconds| -seconds),
                usec: 0,
            },
        }
    }

    /// Whole-second part as a `KerberosTime`.
    ///
    /// Fails for instants before the epoch or after year 9999.
    pub fn kerberos_time(&self) -> der::Result<KerberosTime> {
        let seconds = u64::try_from(self.seconds).map_err(|_| der::Error::from(der::ErrorKind::DateTime))?;
        KerberosTime::from_unix_duration(Duration::from_secs(seconds))
    }

    pub fn from_kerberos_time(time: &KerberosTime, usec: Microseconds) -> Self {
        Self {
            seconds: i64::try_from(time.to_unix_duration().as_secs()).unwrap_or(i64::MAX),
            usec,
        }
    }
}

/// Whether `message_seconds` lies within `max_skew` of `now_seconds`, both ends included.
pub fn within_skew(message_seconds: i64, now_seconds: i64, max_skew: Duration) -> bool {
    message_seconds.abs_diff(now_seconds) <= max_skew.as_secs()
}

/// Source of the wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> KerberosTimestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> KerberosTimestamp {
        KerberosTimestamp::from_system_time(SystemTime::now())
    }
}
