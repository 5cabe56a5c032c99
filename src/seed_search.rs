//! Brute-force recovery of an MT19937 seed from an observed first output.

use crate::mt19937::Mt19937;

/// Find the seed whose generator's first output equals `observed`.
///
/// Candidates are tried in the order the iterator yields them, so the caller
/// controls both the search order and the bound. Returns `None` once the
/// candidate space is exhausted; the search never runs open-ended.
pub fn find_seed(observed: u32, candidates: impl IntoIterator<Item = u32>) -> Option<u32> {
    candidates
        .into_iter()
        .find(|&seed| Mt19937::new(seed).generate() == observed)
}

/// Recover a timestamp seed by searching the window `[now - max_age, now]`
/// in descending order, i.e. most recent first.
///
/// This models the common misuse of seeding with the current UNIX time: if
/// an output was observed and we know roughly when, only a small window of
/// seeds is plausible.
pub fn find_timestamp_seed(observed: u32, now: u32, max_age: u32) -> Option<u32> {
    let oldest = now.saturating_sub(max_age);
    find_seed(observed, (oldest..=now).rev())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_seed_recovers_seed_from_first_output() {
        let secret_seed = 48213;
        let observed = Mt19937::new(secret_seed).generate();

        let found = find_seed(observed, 0..=u16::MAX as u32);

        assert_eq!(found, Some(secret_seed));
    }

    #[test]
    fn find_seed_returns_none_when_candidates_exhausted() {
        let observed = Mt19937::new(500_000).generate();

        let found = find_seed(observed, 0..1000);

        assert_eq!(found, None);
    }

    #[test]
    fn find_timestamp_seed_recovers_recent_timestamp_seed() {
        let now: u32 = 1_700_000_000;
        // Seeded some time in the last ~17 minutes.
        let seed_time = now - 987;
        let observed = Mt19937::new(seed_time).generate();

        let found = find_timestamp_seed(observed, now, 1000);

        assert_eq!(found, Some(seed_time));
    }

    #[test]
    fn find_timestamp_seed_gives_up_outside_window() {
        let now: u32 = 1_700_000_000;
        let observed = Mt19937::new(now - 5000).generate();

        let found = find_timestamp_seed(observed, now, 1000);

        assert_eq!(found, None);
    }
}
