//! Bearer token cache and freshness rules.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tokio::sync::RwLock;

/// Tokens are treated as expired this long before the provider's expiry.
pub const SAFETY_BUFFER: Duration = Duration::minutes(5);

/// Clock trait - abstracts time operations for testability
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a clock that always returns `time`
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Bearer token issued by the provider
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Opaque bearer value
    pub value: String,
    /// Provider-declared expiry
    pub expiry: DateTime<Utc>,
}

impl Token {
    /// Create a token
    #[must_use]
    pub fn new(value: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expiry,
        }
    }

    /// Usable while `now < expiry - SAFETY_BUFFER`.
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expiry - SAFETY_BUFFER
    }
}

/// Parse the provider's `expiryDate`.
///
/// Accepts RFC 3339 (`2024-07-20T12:29:30.5177702Z`) and offset-less ISO
/// timestamps, which are taken as UTC.
#[must_use]
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Single token slot owned by a gateway client.
///
/// Reads and writes are short critical sections; the lock is never held
/// across a network call, so two callers racing on an expired token may
/// both authenticate. The later token simply replaces the earlier one.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: RwLock<Option<Token>>,
}

impl TokenCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached token if it is still valid at `now`
    pub async fn current(&self, now: DateTime<Utc>) -> Option<Token> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_valid(now))
            .cloned()
    }

    /// Replace the cached token
    pub async fn store(&self, token: Token) {
        *self.slot.write().await = Some(token);
    }

    /// Drop the cached token
    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_validity_boundary() {
        let expiry = at(10_000);
        let token = Token::new("t", expiry);

        assert!(token.is_valid(expiry - Duration::minutes(6)));
        assert!(token.is_valid(expiry - SAFETY_BUFFER - Duration::seconds(1)));
        assert!(!token.is_valid(expiry - SAFETY_BUFFER));
        assert!(!token.is_valid(expiry - Duration::minutes(4)));
        assert!(!token.is_valid(expiry + Duration::minutes(1)));
    }

    #[test]
    fn test_parse_expiry_formats() {
        let zulu = parse_expiry("2024-07-20T12:29:30.5177702Z").unwrap();
        assert_eq!(zulu.timestamp(), at(1_721_478_570).timestamp());

        let naive = parse_expiry("2024-07-20T12:29:30.517").unwrap();
        assert_eq!(naive.timestamp(), zulu.timestamp());

        let offset = parse_expiry("2024-07-20T15:29:30+03:00").unwrap();
        assert_eq!(offset.timestamp(), zulu.timestamp());

        assert!(parse_expiry("next tuesday").is_none());
    }

    #[tokio::test]
    async fn test_cache_hides_stale_tokens() {
        let cache = TokenCache::new();
        let expiry = at(100_000);
        assert!(cache.current(at(0)).await.is_none());

        cache.store(Token::new("abc", expiry)).await;
        assert_eq!(
            cache.current(at(0)).await.map(|t| t.value),
            Some("abc".to_string())
        );
        assert!(cache.current(expiry).await.is_none());

        cache.clear().await;
        assert!(cache.current(at(0)).await.is_none());
    }

    #[tokio::test]
    async fn test_store_replaces_wholesale() {
        let cache = TokenCache::new();
        cache.store(Token::new("first", at(100_000))).await;
        cache.store(Token::new("second", at(200_000))).await;

        let current = cache.current(at(150_000)).await.unwrap();
        assert_eq!(current, Token::new("second", at(200_000)));
    }

    proptest! {
        #[test]
        fn prop_is_valid_is_idempotent(expiry in 0i64..4_000_000_000, now in 0i64..4_000_000_000) {
            let token = Token::new("t", at(expiry));
            let first = token.is_valid(at(now));
            let second = token.is_valid(at(now));
            prop_assert_eq!(first, second);
            prop_assert_eq!(first, now < expiry - SAFETY_BUFFER.num_seconds());
        }

        #[test]
        fn prop_cache_read_does_not_mutate(expiry in 0i64..4_000_000_000, now in 0i64..4_000_000_000) {
            let cache = TokenCache::new();
            let token = Token::new("t", at(expiry));
            let (first, second) = tokio_test::block_on(async {
                cache.store(token.clone()).await;
                (cache.current(at(now)).await, cache.current(at(now)).await)
            });
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.is_some(), token.is_valid(at(now)));
        }
    }
}
