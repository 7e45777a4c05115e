// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::TitleSummary;

/// `needle` must already be lowercase.
fn title_matches(title: &str, needle: &str) -> bool {
    title.to_lowercase().contains(needle)
}

/// Case-insensitive substring filter. Keeps the relative order of `full`; an
/// empty query returns `full` unchanged.
pub fn filter_titles(full: &[TitleSummary], query: &str) -> Vec<TitleSummary> {
    if query.is_empty() {
        return full.to_vec();
    }

    let needle = query.to_lowercase();
    full.iter()
        .filter(|item| title_matches(&item.title, &needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::filter_titles;
    use crate::{MovieId, TitleSummary};

    fn catalog() -> Vec<TitleSummary> {
        vec![
            TitleSummary::new(1, "Up"),
            TitleSummary::new(2, "Upstream"),
            TitleSummary::new(3, "Down"),
        ]
    }

    fn ids(titles: &[TitleSummary]) -> Vec<MovieId> {
        titles.iter().map(|title| title.id.clone()).collect()
    }

    #[test]
    fn lowercase_query_matches_prefix_and_substring() {
        let shown = filter_titles(&catalog(), "up");
        assert_eq!(ids(&shown), vec![MovieId::from(1), MovieId::from(2)]);
    }

    #[test]
    fn empty_query_is_identity() {
        assert_eq!(filter_titles(&catalog(), ""), catalog());
    }

    #[test]
    fn query_case_is_ignored() {
        assert_eq!(
            filter_titles(&catalog(), "OWN"),
            vec![TitleSummary::new(3, "Down")]
        );
        assert_eq!(
            filter_titles(&[TitleSummary::new(7, "Amélie")], "AMÉL"),
            vec![TitleSummary::new(7, "Amélie")]
        );
    }

    #[test]
    fn matches_keep_catalog_order_for_duplicates() {
        let full = vec![
            TitleSummary::new(9, "Heat"),
            TitleSummary::new(4, "Wheat Field"),
            TitleSummary::new(9, "Heat"),
            TitleSummary::new(1, "Cold"),
        ];
        let shown = filter_titles(&full, "heat");
        assert_eq!(
            ids(&shown),
            vec![MovieId::from(9), MovieId::from(4), MovieId::from(9)]
        );
    }

    #[test]
    fn whitespace_is_part_of_the_needle() {
        assert!(filter_titles(&catalog(), " up").is_empty());
        assert!(filter_titles(&catalog(), "no such title").is_empty());
    }

    #[test]
    fn result_equals_naive_predicate_for_every_query() {
        let full = catalog();
        for query in ["", "u", "U", "p", "str", "wn", "x", "upstream", "UPSTREAMS"] {
            let expected = full
                .iter()
                .filter(|item| item.title.to_lowercase().contains(&query.to_lowercase()))
                .cloned()
                .collect::<Vec<_>>();
            assert_eq!(filter_titles(&full, query), expected, "query {query:?}");
        }
    }
}
