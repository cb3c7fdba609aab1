// Integration tests for the candidate matcher

use tatort_rename::catalog::{CatalogIndex, RawCatalog, RawEpisode};
use tatort_rename::matcher::Matcher;

const TITLES: &[&str] = &[
    "Taxi nach Leipzig",
    "Reifezeugnis",
    "Im Schmerz geboren",
    "Im Schmerz geboren II",
    "Kressin und der tote Mann im Fleet",
    "Kressin stoppt den Nordexpress",
    "Der Wald steht schwarz und schweiget",
    "Episode 2016x39 - Janneke & Brix - 05 - Land in dieser Zeit",
    "Tod im Häcksler",
    "Schimanskis Waffe",
    "Mord/Totschlag",
    "Schwarzer Advent",
];

fn index() -> CatalogIndex {
    let mut raw = RawCatalog::new();
    for (n, title) in TITLES.iter().enumerate() {
        raw.entry(1).or_default().insert(n as u32 + 1, RawEpisode {
            id: 100 + n as u64,
            name: Some(title.to_string()),
            ..Default::default()
        });
    }
    CatalogIndex::build(raw).unwrap()
}

const QUERIES: &[&str] = &[
    "Tatort - Taxi nach Leipzig",
    "Tatort.Im.Schmerz.geboren.720p.German",
    "tatort_kressin",
    "Land in dieser Zeit (2016)",
    "Tatort Schwarz",
    "Mord Totschlag",
];

#[test]
fn test_match_is_deterministic() {
    let index = index();
    let matcher = Matcher::new("Tatort");
    for query in QUERIES {
        let first = matcher.find(query, &index);
        for _ in 0..5 {
            assert_eq!(matcher.find(query, &index), first, "query {query}");
        }
    }
}

#[test]
fn test_ranking_is_descending() {
    let index = index();
    let matcher = Matcher::new("Tatort").with_cutoff(0).with_limit(TITLES.len());
    for query in QUERIES {
        let found = matcher.find(query, &index);
        assert!(!found.is_empty());
        for pair in found.windows(2) {
            assert!(pair[0].score >= pair[1].score, "query {query}: {:?}", found);
            if pair[0].score == pair[1].score {
                assert!(pair[0].entry_id < pair[1].entry_id);
            }
        }
    }
}

#[test]
fn test_raising_cutoff_never_adds_candidates() {
    let index = index();
    for query in QUERIES {
        let mut previous = usize::MAX;
        for cutoff in (0..=100).step_by(5) {
            let count = Matcher::new("Tatort")
                .with_cutoff(cutoff)
                .with_limit(TITLES.len())
                .find(query, &index)
                .len();
            assert!(count <= previous, "query {query} cutoff {cutoff}");
            previous = count;
        }
    }
}

#[test]
fn test_every_candidate_clears_cutoff() {
    let index = index();
    let matcher = Matcher::new("Tatort").with_cutoff(60);
    for query in QUERIES {
        assert!(matcher.find(query, &index).iter().all(|c| c.score >= 60));
    }
}

#[test]
fn test_matches_against_stripped_title() {
    let index = index();
    let found = Matcher::new("Tatort").find("Land in dieser Zeit", &index);

    assert_eq!(found[0].entry_id, 107);
    assert_eq!(found[0].search_title, "Land in dieser Zeit");
    assert_eq!(found[0].score, 100);
}

#[test]
fn test_noisy_filename_finds_title() {
    let index = index();
    let found = Matcher::new("Tatort").find("Tatort.Taxi.nach.Leipzig.1080p.German", &index);
    assert_eq!(found[0].entry_id, 100);
}

#[test]
fn test_sequels_are_close() {
    let index = index();
    let found = Matcher::new("Tatort").find("Tatort - Im Schmerz geboren", &index);

    assert_eq!(found[0].entry_id, 102);
    assert_eq!(found[0].score, 100);
    assert_eq!(found[1].entry_id, 103);
    assert!(found[0].score - found[1].score <= 10);
}
