// src/services/review_stats.rs

use std::collections::BTreeMap;

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

use crate::models::review::{RatingSample, ReviewStats};

/// Arredonda para 1 casa decimal, meio para cima (4.25 -> 4.3).
pub fn round_rating(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Média arredondada; 0 quando não há notas.
pub fn average_rating(ratings: &[Decimal]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = ratings.iter().copied().sum();
    round_rating(sum / Decimal::from(ratings.len()))
}

fn empty_distribution() -> BTreeMap<u8, i64> {
    (1..=5).map(|bucket| (bucket, 0)).collect()
}

// Meia nota cai no balde inteiro de baixo (4.5 -> 4), assim os baldes somam o total.
fn bucket_for(rating: Decimal) -> u8 {
    rating.trunc().to_u8().unwrap_or(1).clamp(1, 5)
}

impl ReviewStats {
    pub fn empty() -> Self {
        Self {
            average_rating: Decimal::ZERO,
            total_reviews: 0,
            rating_distribution: empty_distribution(),
            recommendation_rate: 0,
        }
    }

    pub fn from_samples(samples: &[RatingSample]) -> Self {
        if samples.is_empty() {
            return Self::empty();
        }

        let ratings: Vec<Decimal> = samples.iter().map(|s| s.rating).collect();

        let mut distribution = empty_distribution();
        for rating in &ratings {
            *distribution.entry(bucket_for(*rating)).or_insert(0) += 1;
        }

        let total = samples.len() as i64;
        let recommended = samples.iter().filter(|s| s.is_recommended).count() as i64;
        let rate = (Decimal::from(recommended) * Decimal::ONE_HUNDRED / Decimal::from(total))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u8()
            .unwrap_or(0);

        Self {
            average_rating: average_rating(&ratings),
            total_reviews: total,
            rating_distribution: distribution,
            recommendation_rate: rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn sample(rating: &str, is_recommended: bool) -> RatingSample {
        RatingSample { rating: d(rating), is_recommended }
    }

    #[test]
    fn rounding_is_half_up_to_one_decimal() {
        assert_eq!(round_rating(d("4.25")), d("4.3"));
        assert_eq!(round_rating(d("4.24")), d("4.2"));
        assert_eq!(round_rating(d("3.3333333")), d("3.3"));
        assert_eq!(round_rating(d("4.05")), d("4.1"));
    }

    #[test]
    fn average_matches_known_scenario() {
        assert_eq!(average_rating(&[d("5"), d("4"), d("3")]), d("4.0"));
        assert_eq!(average_rating(&[d("5"), d("4")]), d("4.5"));
        assert_eq!(average_rating(&[]), Decimal::ZERO);
    }

    #[test]
    fn no_reviews_gives_zeroed_stats() {
        let stats = ReviewStats::from_samples(&[]);
        assert_eq!(stats, ReviewStats::empty());
        assert_eq!(stats.rating_distribution.len(), 5);
        assert!(stats.rating_distribution.values().all(|c| *c == 0));
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.recommendation_rate, 0);
    }

    #[test]
    fn stats_for_mixed_reviews() {
        let stats = ReviewStats::from_samples(&[
            sample("5", true),
            sample("4", true),
            sample("3", false),
        ]);

        assert_eq!(stats.average_rating, d("4.0"));
        assert_eq!(stats.total_reviews, 3);
        assert_eq!(stats.rating_distribution[&5], 1);
        assert_eq!(stats.rating_distribution[&4], 1);
        assert_eq!(stats.rating_distribution[&3], 1);
        assert_eq!(stats.rating_distribution[&1], 0);
        // 2/3 = 66.67% -> 67
        assert_eq!(stats.recommendation_rate, 67);
    }

    #[test]
    fn half_ratings_are_bucketed_by_truncation() {
        let stats = ReviewStats::from_samples(&[
            sample("4.5", true),
            sample("1.5", false),
            sample("5", true),
        ]);

        assert_eq!(stats.rating_distribution.len(), 5);
        assert_eq!(stats.rating_distribution[&4], 1);
        assert_eq!(stats.rating_distribution[&1], 1);
        assert_eq!(stats.rating_distribution[&5], 1);
        let bucketed: i64 = stats.rating_distribution.values().sum();
        assert_eq!(bucketed, stats.total_reviews);
        // (4.5 + 1.5 + 5) / 3 = 3.666.. -> 3.7
        assert_eq!(stats.average_rating, d("3.7"));
    }

    #[test]
    fn recommendation_rate_rounds_half_up() {
        // 1/8 = 12.5% -> 13
        let mut samples = vec![sample("3", true)];
        samples.extend((0..7).map(|_| sample("3", false)));
        assert_eq!(ReviewStats::from_samples(&samples).recommendation_rate, 13);

        let all = [sample("2", true), sample("4", true)];
        assert_eq!(ReviewStats::from_samples(&all).recommendation_rate, 100);
    }
}
