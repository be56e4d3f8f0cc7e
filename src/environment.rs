//! Side effects the filters depend on, injected into the [`Evaluator`].
//!
//! `now` and `date` read a [`Clock`], `hash` asks a [`Fingerprint`]. Plain
//! closures implement both traits, so tests can pin time or hashing inline:
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use transmute::Evaluator;
//!
//! let evaluator = Evaluator::new()
//!     .with_clock(|| Utc.with_ymd_and_hms(2017, 4, 11, 0, 0, 0).unwrap())
//!     .with_fingerprint(|input: &str| format!("len:{}", input.len()));
//! ```
//!
//! [`Evaluator`]: crate::Evaluator

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Stable digest of a serialized value.
pub trait Fingerprint: Send + Sync {
    fn fingerprint(&self, input: &str) -> String;
}

/// Wall clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// Lowercase hex MD5, 32 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Fingerprint;

impl Fingerprint for Md5Fingerprint {
    fn fingerprint(&self, input: &str) -> String {
        format!("{:x}", Md5::digest(input.as_bytes()))
    }
}

impl<F> Fingerprint for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn fingerprint(&self, input: &str) -> String {
        self(input)
    }
}

#[test]
fn test_md5_fingerprint() {
    assert_eq!(Md5Fingerprint.fingerprint(""), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(Md5Fingerprint.fingerprint("abc"), "900150983cd24fb0d6963f7d28e17f72");
}
