use rand::Rng;
use std::fmt;
use std::time::Duration;

/// 发送前的等待：固定秒数，或闭区间 `A..B` 内均匀随机的秒数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    Fixed(u64),
    Range(u64, u64),
}

impl Delay {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.split_once("..") {
            Some((low, high)) => {
                let low = low.trim().parse().ok()?;
                let high = high.trim().parse().ok()?;
                (low <= high).then_some(Delay::Range(low, high))
            }
            None => raw.parse().ok().map(Delay::Fixed),
        }
    }

    pub fn sample(&self) -> Duration {
        let secs = match *self {
            Delay::Fixed(secs) => secs,
            Delay::Range(low, high) => rand::rng().random_range(low..=high),
        };
        Duration::from_secs(secs)
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delay::Fixed(secs) => write!(f, "{}", secs),
            Delay::Range(low, high) => write!(f, "{}..{}", low, high),
        }
    }
}
