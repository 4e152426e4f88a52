//! Human-readable unique references (`ORD-…`, `TKT-…`, `QR-…`).

use chrono::Utc;
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// `<prefix>-<unix millis>-<9 random base36 chars>`
///
/// The random suffix keeps references distinct when several are minted in
/// the same millisecond.
#[must_use]
pub fn reference(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();

    format!("{prefix}-{}-{suffix}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_reference_shape() {
        let id = reference("ORD");
        let parts: Vec<&str> = id.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_references_do_not_collide() {
        let ids: HashSet<String> = (0..1_000).map(|_| reference("TKT")).collect();
        assert_eq!(ids.len(), 1_000);
    }
}
