//! Human-readable sentences derived from a finished stats bundle.

use paperdash_shared::StatsBundle;

/// Number of topic words quoted in the themes sentence.
const THEME_WORDS: usize = 5;

/// Build the insight sentences for `stats`, in a fixed order.
///
/// Reads only the aggregates already in the bundle. A sentence whose
/// underlying data is missing is left out.
pub fn derive_insights(stats: &StatsBundle) -> Vec<String> {
    let mut insights = Vec::new();

    // Earliest year wins a tie: the list is ascending and only a strictly
    // larger count replaces the current pick.
    if let Some(peak) = first_max_by_count(&stats.year_counts, |y| y.count) {
        insights.push(format!(
            "{} is the busiest year with {} papers listed.",
            peak.year, peak.count
        ));
    }

    if let [first, .., last] = stats.year_counts.as_slice() {
        if last.count > first.count {
            insights.push(format!(
                "Paper volume grew by {} from {} to {}.",
                last.count - first.count,
                first.year,
                last.year
            ));
        }
    }

    if let Some(top) = stats.venue_counts.first() {
        insights.push(format!(
            "{} appears most often ({} times).",
            top.venue, top.count
        ));
    }

    if !stats.topics.is_empty() {
        let themes: Vec<&str> = stats
            .topics
            .iter()
            .take(THEME_WORDS)
            .map(|t| t.topic.as_str())
            .collect();
        insights.push(format!(
            "Dominant themes across titles: {}.",
            themes.join(", ")
        ));
    }

    let code = &stats.code_availability;
    if code.total > 0 {
        // Debug keeps the decimal point on whole numbers: "50.0%", not "50%".
        insights.push(format!(
            "Code is linked for {} papers ({:?}%).",
            code.with_code, code.percentage
        ));
    }

    // Categories are sorted by name, so a tie resolves to the smallest name.
    if let Some(largest) = first_max_by_count(&stats.category_counts, |c| c.count) {
        insights.push(format!(
            "{} contains the most entries ({}).",
            largest.category, largest.count
        ));
    }

    insights
}

fn first_max_by_count<T>(items: &[T], count: impl Fn(&T) -> usize) -> Option<&T> {
    items.iter().fold(None, |best, item| match best {
        Some(current) if count(item) <= count(current) => Some(current),
        _ => Some(item),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperdash_shared::{CategoryCount, CodeAvailability, TopicCount, VenueCount, YearCount};

    fn years(pairs: &[(i32, usize)]) -> Vec<YearCount> {
        pairs
            .iter()
            .map(|&(year, count)| YearCount { year, count })
            .collect()
    }

    #[test]
    fn empty_bundle_has_no_insights() {
        assert!(derive_insights(&StatsBundle::default()).is_empty());
    }

    #[test]
    fn peak_year_tie_goes_to_earliest() {
        let stats = StatsBundle {
            year_counts: years(&[(2019, 3), (2020, 5), (2021, 5)]),
            ..Default::default()
        };
        let insights = derive_insights(&stats);
        assert_eq!(insights[0], "2020 is the busiest year with 5 papers listed.");
    }

    #[test]
    fn growth_only_when_last_exceeds_first() {
        let grew = StatsBundle {
            year_counts: years(&[(2018, 1), (2020, 4)]),
            ..Default::default()
        };
        assert!(
            derive_insights(&grew).contains(&"Paper volume grew by 3 from 2018 to 2020.".to_string())
        );

        let shrank = StatsBundle {
            year_counts: years(&[(2018, 4), (2020, 1)]),
            ..Default::default()
        };
        assert!(!derive_insights(&shrank).iter().any(|s| s.contains("grew")));

        let single = StatsBundle {
            year_counts: years(&[(2018, 4)]),
            ..Default::default()
        };
        assert_eq!(derive_insights(&single).len(), 1);
    }

    #[test]
    fn full_bundle_in_fixed_order() {
        let stats = StatsBundle {
            year_counts: years(&[(2021, 1), (2022, 2)]),
            venue_counts: vec![VenueCount { venue: "KDD".into(), count: 2 }],
            topics: ["spectral", "camouflage", "heterophily", "temporal", "bitcoin", "extra"]
                .iter()
                .map(|t| TopicCount { topic: t.to_string(), count: 1 })
                .collect(),
            code_availability: CodeAvailability { with_code: 2, total: 3, percentage: 66.67 },
            category_counts: vec![
                CategoryCount { category: "Graph-level".into(), count: 2 },
                CategoryCount { category: "Node-level".into(), count: 2 },
            ],
            ..Default::default()
        };

        assert_eq!(
            derive_insights(&stats),
            vec![
                "2022 is the busiest year with 2 papers listed.",
                "Paper volume grew by 1 from 2021 to 2022.",
                "KDD appears most often (2 times).",
                "Dominant themes across titles: spectral, camouflage, heterophily, temporal, bitcoin.",
                "Code is linked for 2 papers (66.67%).",
                "Graph-level contains the most entries (2).",
            ]
        );
    }

    #[test]
    fn whole_percentage_keeps_decimal_point() {
        let stats = StatsBundle {
            code_availability: CodeAvailability { with_code: 1, total: 2, percentage: 50.0 },
            ..Default::default()
        };
        assert_eq!(derive_insights(&stats), vec!["Code is linked for 1 papers (50.0%)."]);
    }

    #[test]
    fn code_sentence_omitted_without_papers() {
        let stats = StatsBundle {
            venue_counts: vec![VenueCount { venue: "WWW".into(), count: 1 }],
            ..Default::default()
        };
        let insights = derive_insights(&stats);
        assert_eq!(insights, vec!["WWW appears most often (1 times)."]);
    }
}
