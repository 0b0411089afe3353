//! # 時刻の供給元
//!
//! 監査フィールドに記録する現在時刻はすべて [`Clock`] から取得する。
//! テストでは [`ManualClock`] を注入し、時刻を明示的に進める。

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// OS の時計を読む
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 呼び出し側が操作するまで止まっている時計
///
/// ```
/// use chrono::{DateTime, Duration};
/// use storify_domain::clock::{Clock, ManualClock};
///
/// let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
/// let clock = ManualClock::starting_at(start);
/// clock.advance(Duration::minutes(5));
/// assert_eq!(clock.now(), start + Duration::minutes(5));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    current: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            current: RwLock::new(start),
        }
    }

    /// 時計を `step` だけ進める
    pub fn advance(&self, step: Duration) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current += step;
    }

    /// 時計を任意の時刻に合わせる
    pub fn set(&self, at: DateTime<Utc>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }
}
