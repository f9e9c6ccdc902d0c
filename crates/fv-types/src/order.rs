use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::feature::Feature;

/// Ordering policy applied to a feature collection at query time.
///
/// Every policy ends in an `id` tiebreak so results are deterministic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureOrder {
    /// Default collection order: votes desc, then created_at desc.
    #[default]
    Ranked,
    /// Votes desc only; ties keep insertion order (id asc).
    TopVoted,
    /// created_at desc.
    Recent,
}

impl FeatureOrder {
    pub fn compare(self, a: &Feature, b: &Feature) -> Ordering {
        match self {
            Self::Ranked => b
                .votes
                .cmp(&a.votes)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id)),
            Self::TopVoted => b.votes.cmp(&a.votes).then(a.id.cmp(&b.id)),
            Self::Recent => b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)),
        }
    }

    pub fn sort(self, features: &mut [Feature]) {
        features.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureId;
    use chrono::{TimeZone, Utc};

    fn feature(id: u64, votes: u64, created_secs: i64) -> Feature {
        let mut f = Feature::new(
            FeatureId::new(id),
            format!("Feature {id}"),
            "d",
            Utc.timestamp_opt(created_secs, 0).unwrap(),
        );
        f.votes = votes;
        f
    }

    fn ids(features: &[Feature]) -> Vec<u64> {
        features.iter().map(|f| f.id.get()).collect()
    }

    #[test]
    fn ranked_orders_by_votes_then_recency() {
        let mut fs = vec![feature(1, 3, 10), feature(2, 5, 5), feature(3, 3, 20), feature(4, 0, 30)];
        FeatureOrder::Ranked.sort(&mut fs);
        assert_eq!(ids(&fs), vec![2, 3, 1, 4]);
    }

    #[test]
    fn ranked_breaks_full_ties_by_newest_id() {
        let mut fs = vec![feature(1, 1, 10), feature(2, 1, 10)];
        FeatureOrder::Ranked.sort(&mut fs);
        assert_eq!(ids(&fs), vec![2, 1]);
    }

    #[test]
    fn top_voted_ignores_recency() {
        let mut fs = vec![feature(1, 3, 10), feature(2, 3, 50), feature(3, 9, 0)];
        FeatureOrder::TopVoted.sort(&mut fs);
        assert_eq!(ids(&fs), vec![3, 1, 2]);
    }

    #[test]
    fn recent_ignores_votes() {
        let mut fs = vec![feature(1, 100, 10), feature(2, 0, 30), feature(3, 7, 20)];
        FeatureOrder::Recent.sort(&mut fs);
        assert_eq!(ids(&fs), vec![2, 3, 1]);
    }

    #[test]
    fn default_is_ranked() {
        assert_eq!(FeatureOrder::default(), FeatureOrder::Ranked);
    }
}
