//! Value scoring and batch eviction under budget pressure.
//!
//! ```text
//! score = min(access_count * 10, 100)
//!       + category_bonus
//!       - min(age / 1 day * 10, 50)
//!       - min(idle / 1 hour * 5, 30)
//! ```
//!
//! Scores are floored at zero. Lowest scores are evicted first, and a pass
//! keeps going until the requested space is freed *and* the entry count is
//! below 80% of the budget, so one pass buys headroom for several inserts.

use super::classify::ContentCategory;
use super::entry::CacheEntry;

const DAY_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;
const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;

/// Fraction of `max_entries` an eviction pass drains the store below.
pub const LOW_WATER_RATIO: f64 = 0.8;

pub fn category_bonus(category: ContentCategory) -> f64 {
    match category {
        ContentCategory::Static => 50.0,
        ContentCategory::Documentation => 40.0,
        ContentCategory::General => 20.0,
        ContentCategory::Ecommerce => 10.0,
        ContentCategory::News => 5.0,
        ContentCategory::Social => 0.0,
    }
}

/// Retention value of an entry; higher is kept longer.
pub fn score(entry: &CacheEntry, now_ms: i64) -> f64 {
    let access = (entry.access_count as f64 * 10.0).min(100.0);
    let age_penalty = (entry.age_ms(now_ms) as f64 / DAY_MS * 10.0).min(50.0);
    let idle_penalty = (entry.idle_ms(now_ms) as f64 / HOUR_MS * 5.0).min(30.0);

    (access + category_bonus(entry.content_type) - age_penalty - idle_penalty).max(0.0)
}

/// Keys chosen for removal by one eviction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionPlan {
    pub victims: Vec<String>,
    pub freed_bytes: u64,
}

/// Rank entries and pick victims until both termination conditions hold.
///
/// Ties are broken by least recent access, then by key, so a pass is
/// deterministic for a given store and clock.
pub fn plan<'a, I>(entries: I, space_needed: u64, max_entries: usize, now_ms: i64) -> EvictionPlan
where
    I: IntoIterator<Item = (&'a String, &'a CacheEntry)>,
{
    let mut ranked: Vec<(f64, i64, &String, u64)> = entries
        .into_iter()
        .map(|(key, entry)| (score(entry, now_ms), entry.last_accessed, key, entry.size_bytes))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then_with(|| a.2.cmp(b.2)));

    let low_water = max_entries as f64 * LOW_WATER_RATIO;
    let mut remaining = ranked.len();
    let mut plan = EvictionPlan::default();

    for (_, _, key, size) in ranked {
        if plan.freed_bytes >= space_needed && (remaining as f64) < low_water {
            break;
        }
        plan.victims.push(key.clone());
        plan.freed_bytes += size;
        remaining -= 1;
    }

    plan
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::PageContent;

    const NOW: i64 = 100 * DAY_MS as i64;

    fn entry(category: ContentCategory, access_count: u64, age_ms: i64, idle_ms: i64, size: u64) -> CacheEntry {
        let mut e = CacheEntry::new(
            "https://a.com",
            PageContent::new("T", "x".repeat(100)),
            "h".into(),
            category,
            NOW - age_ms,
            DAY_MS as i64 * 365,
        );
        e.access_count = access_count;
        e.last_accessed = NOW - idle_ms;
        e.size_bytes = size;
        e
    }

    #[test]
    fn test_score_components() {
        let fresh_static = entry(ContentCategory::Static, 0, 0, 0, 1);
        assert_eq!(score(&fresh_static, NOW), 50.0);

        let popular = entry(ContentCategory::Social, 20, 0, 0, 1);
        assert_eq!(score(&popular, NOW), 100.0);

        let one_day_old = entry(ContentCategory::General, 0, DAY_MS as i64, 0, 1);
        assert_eq!(score(&one_day_old, NOW), 10.0);

        let idle_two_hours = entry(ContentCategory::Documentation, 0, 0, 2 * HOUR_MS as i64, 1);
        assert_eq!(score(&idle_two_hours, NOW), 30.0);
    }

    #[test]
    fn test_score_floors_at_zero() {
        let stale = entry(ContentCategory::Social, 0, 30 * DAY_MS as i64, 30 * DAY_MS as i64, 1);
        assert_eq!(score(&stale, NOW), 0.0);
    }

    #[test]
    fn test_old_social_evicted_before_hot_static() {
        let a = entry(ContentCategory::Social, 1, 10 * DAY_MS as i64, 10 * DAY_MS as i64, 10);
        let b = entry(ContentCategory::Static, 50, HOUR_MS as i64, 0, 10);
        assert!(score(&a, NOW) < score(&b, NOW));

        let entries: HashMap<String, CacheEntry> = [("a".to_string(), a), ("b".to_string(), b)].into();
        let plan = plan(&entries, 0, 2, NOW);
        assert_eq!(plan.victims, vec!["a".to_string()]);
        assert_eq!(plan.freed_bytes, 10);
    }

    #[test]
    fn test_batch_drains_below_low_water() {
        let entries: HashMap<String, CacheEntry> =
            (0..10).map(|i| (format!("k{i}"), entry(ContentCategory::General, i, 0, 0, 1))).collect();

        // 10 entries, budget 10: must drop to < 8, i.e. 7 remaining.
        let plan = plan(&entries, 0, 10, NOW);
        assert_eq!(plan.victims.len(), 3);
        assert_eq!(plan.victims, vec!["k0".to_string(), "k1".to_string(), "k2".to_string()]);
    }

    #[test]
    fn test_space_condition_extends_batch() {
        let entries: HashMap<String, CacheEntry> =
            (0..4).map(|i| (format!("k{i}"), entry(ContentCategory::General, i, 0, 0, 100))).collect();

        let plan = plan(&entries, 250, 100, NOW);
        assert_eq!(plan.victims.len(), 3);
        assert_eq!(plan.freed_bytes, 300);
    }

    #[test]
    fn test_nothing_to_do() {
        let entries: HashMap<String, CacheEntry> =
            [("k".to_string(), entry(ContentCategory::General, 0, 0, 0, 1))].into();
        let plan = plan(&entries, 0, 100, NOW);
        assert!(plan.victims.is_empty());
    }
}
