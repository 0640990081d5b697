//! Advanced Result Tests
//!
//! Query strings go through the translator and the assembler against a
//! seeded document store, exercising the public API end to end:
//! 1. Pagination window and neighbour links
//! 2. Filtering, sorting and projection
//! 3. Lenient pagination input
//! 4. Malformed filter rejection
//! 5. Determinism

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use devcamp::rest_api::{
    DocumentStore, Expansion, PageRef, PaginationWindow, QueryTranslator, RestError,
    ResultAssembler, ResultEnvelope,
};

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// 47 bootcamps, `b0` oldest, `b46` newest
fn seeded_store() -> Arc<DocumentStore> {
    let bootcamps: Vec<Value> = (0..47)
        .map(|i| {
            json!({
                "_id": format!("b{}", i),
                "name": format!("Bootcamp {}", i),
                "averageCost": 5000 + i * 250,
                "careers": if i % 2 == 0 {
                    json!(["Web Development", "UI/UX"])
                } else {
                    json!(["Data Science"])
                },
                "housing": i % 3 == 0,
                "location": { "state": if i < 10 { "MA" } else { "CA" } },
                "createdAt": format!("2024-01-01T00:00:{:02}Z", i),
            })
        })
        .collect();

    let store = Arc::new(DocumentStore::new());
    store.import(&json!({ "bootcamps": bootcamps })).unwrap();
    store
}

fn run(store: &Arc<DocumentStore>, pairs: &[(&str, &str)]) -> Result<ResultEnvelope, RestError> {
    let plan = QueryTranslator::translate(&params(pairs))?;
    ResultAssembler::assemble(&store.collection("bootcamps"), &plan, None)
}

fn ids(envelope: &ResultEnvelope) -> Vec<&str> {
    envelope
        .data
        .iter()
        .map(|doc| doc["_id"].as_str().unwrap())
        .collect()
}

// =============================================================================
// PAGINATION
// =============================================================================

#[test]
fn test_middle_page_links_both_ways() {
    let store = seeded_store();
    let envelope = run(&store, &[("page", "2"), ("limit", "10")]).unwrap();

    assert_eq!(envelope.count, 10);
    assert_eq!(envelope.pagination.next, Some(PageRef { page: 3, limit: 10 }));
    assert_eq!(envelope.pagination.prev, Some(PageRef { page: 1, limit: 10 }));

    // Default order is newest first
    assert_eq!(ids(&envelope)[0], "b36");
}

#[test]
fn test_last_partial_page() {
    let store = seeded_store();
    let envelope = run(&store, &[("page", "5"), ("limit", "10")]).unwrap();

    assert_eq!(envelope.count, 7);
    assert_eq!(envelope.pagination.next, None);
    assert_eq!(envelope.pagination.prev, Some(PageRef { page: 4, limit: 10 }));
    assert_eq!(ids(&envelope).last(), Some(&"b0"));
}

#[test]
fn test_page_past_the_end_is_empty() {
    let store = seeded_store();
    let envelope = run(&store, &[("page", "6"), ("limit", "10")]).unwrap();

    assert_eq!(envelope.count, 0);
    assert!(envelope.data.is_empty());
    assert_eq!(envelope.pagination.next, None);
    assert_eq!(envelope.pagination.prev, Some(PageRef { page: 5, limit: 10 }));
}

#[test]
fn test_first_page_defaults() {
    let store = seeded_store();
    let envelope = run(&store, &[]).unwrap();

    assert_eq!(envelope.count, 25);
    assert_eq!(envelope.pagination.next, Some(PageRef { page: 2, limit: 25 }));
    assert_eq!(envelope.pagination.prev, None);
}

#[test]
fn test_window_invariants() {
    for total in [0u64, 1, 9, 10, 11, 47] {
        for page in 1..=6u64 {
            for limit in [1u64, 3, 10, 25] {
                let window = PaginationWindow::compute(page, limit, total);
                assert_eq!(window.start_index, (page - 1) * limit);
                assert_eq!(window.end_index, page * limit);
                assert_eq!(window.next.is_some(), window.end_index < total);
                assert_eq!(window.prev.is_some(), window.start_index > 0);
            }
        }
    }
}

#[test]
fn test_count_never_exceeds_limit_or_remaining() {
    let store = seeded_store();
    for page in 1..=6u64 {
        let page_text = page.to_string();
        let envelope = run(&store, &[("page", page_text.as_str()), ("limit", "10")]).unwrap();
        let remaining = 47u64.saturating_sub((page - 1) * 10);
        assert_eq!(envelope.count as u64, remaining.min(10));
        assert_eq!(envelope.count, envelope.data.len());
    }
}

// =============================================================================
// FILTER, SORT, PROJECTION
// =============================================================================

#[test]
fn test_filter_sort_select() {
    let store = seeded_store();
    let envelope = run(
        &store,
        &[
            ("averageCost[lte]", "6000"),
            ("sort", "-averageCost"),
            ("select", "name,averageCost"),
        ],
    )
    .unwrap();

    // averageCost 5000..=6000 → b0..=b4
    assert_eq!(ids(&envelope), vec!["b4", "b3", "b2", "b1", "b0"]);
    assert_eq!(
        envelope.data[0],
        json!({"_id": "b4", "name": "Bootcamp 4", "averageCost": 6000})
    );
}

#[test]
fn test_total_counts_filtered_records() {
    let store = seeded_store();
    // 10 bootcamps in MA, 2 pages of 5
    let envelope = run(&store, &[("location_state", "MA"), ("limit", "5")]).unwrap();

    assert_eq!(envelope.count, 5);
    assert_eq!(envelope.pagination.next, Some(PageRef { page: 2, limit: 5 }));

    let last = run(&store, &[("location_state", "MA"), ("limit", "5"), ("page", "2")]).unwrap();
    assert_eq!(last.count, 5);
    assert_eq!(last.pagination.next, None);
}

#[test]
fn test_in_operator_on_array_field() {
    let store = seeded_store();
    let envelope = run(
        &store,
        &[("careers[in]", "Data Science,Mobile Development"), ("limit", "100")],
    )
    .unwrap();

    assert_eq!(envelope.count, 23);
    assert!(envelope
        .data
        .iter()
        .all(|doc| doc["careers"] == json!(["Data Science"])));
}

#[test]
fn test_object_form_range() {
    let store = seeded_store();
    let envelope = run(
        &store,
        &[("averageCost", "{\"gte\":6000,\"lt\":6500}"), ("sort", "averageCost")],
    )
    .unwrap();

    assert_eq!(ids(&envelope), vec!["b4", "b5"]);
}

#[test]
fn test_boolean_equality() {
    let store = seeded_store();
    let envelope = run(&store, &[("housing", "true"), ("limit", "100")]).unwrap();
    assert_eq!(envelope.count, 16);
}

#[test]
fn test_pattern_is_literal_contains() {
    let store = seeded_store();
    let envelope = run(&store, &[("name[regex]", "camp 4"), ("sort", "name")]).unwrap();

    // "Bootcamp 4" and "Bootcamp 40".."Bootcamp 46"
    assert_eq!(envelope.count, 8);
    assert_eq!(envelope.data[0]["name"], "Bootcamp 4");

    let none = run(&store, &[("name[regex]", "Boot.*")]).unwrap();
    assert_eq!(none.count, 0);
}

#[test]
fn test_expansion_of_references() {
    let store = seeded_store();
    store
        .import(&json!({"courses": [
            {"_id": "c1", "title": "Full Stack", "bootcamp": "b3"},
            {"_id": "c2", "title": "Orphan", "bootcamp": "missing"}
        ]}))
        .unwrap();

    let plan = QueryTranslator::translate(&params(&[("sort", "title")])).unwrap();
    let expand = [Expansion::new("bootcamp", "bootcamps", &["name"])];
    let envelope =
        ResultAssembler::assemble(&store.collection("courses"), &plan, Some(&expand[..])).unwrap();

    assert_eq!(envelope.data[0]["bootcamp"], json!({"_id": "b3", "name": "Bootcamp 3"}));
    assert_eq!(envelope.data[1]["bootcamp"], "missing");
}

#[test]
fn test_unknown_collection_is_empty() {
    let store = seeded_store();
    let plan = QueryTranslator::translate(&HashMap::new()).unwrap();
    let envelope =
        ResultAssembler::assemble(&store.collection("instructors"), &plan, None).unwrap();

    assert_eq!(envelope.count, 0);
    assert_eq!(envelope.pagination, PaginationWindow::compute(1, 25, 0));
}

// =============================================================================
// LENIENT PAGINATION INPUT
// =============================================================================

#[test]
fn test_invalid_page_and_limit_fall_back() {
    let store = seeded_store();
    for (page, limit) in [("0", "0"), ("-3", "-1"), ("abc", "ten"), ("0.9", "")] {
        let envelope = run(&store, &[("page", page), ("limit", limit)]).unwrap();
        assert_eq!(envelope.count, 25, "page={} limit={}", page, limit);
        assert_eq!(envelope.pagination.prev, None);
    }
}

#[test]
fn test_page_and_limit_use_leading_digits() {
    let store = seeded_store();
    let envelope = run(&store, &[("page", "2.5"), ("limit", "10abc")]).unwrap();

    assert_eq!(envelope.count, 10);
    assert_eq!(envelope.pagination.prev, Some(PageRef { page: 1, limit: 10 }));
    assert_eq!(envelope.pagination.next, Some(PageRef { page: 3, limit: 10 }));
}

#[test]
fn test_reserved_keys_with_stray_brackets_are_dropped() {
    let store = seeded_store();
    let envelope = run(
        &store,
        &[("page[]", "2"), ("sort[gt", "name"), ("select]", "name"), ("limit", "100")],
    )
    .unwrap();

    assert_eq!(envelope.count, 47);
}

// =============================================================================
// MALFORMED FILTERS
// =============================================================================

#[test]
fn test_malformed_filters_rejected() {
    let store = seeded_store();
    for (key, value) in [
        ("averageCost", "{gte"),
        ("averageCost[gte", "5"),
        ("averageCost", "{gte:{lt:3}}"),
        ("averageCost", "{gte:1,oops}"),
    ] {
        let result = run(&store, &[(key, value)]);
        assert!(
            matches!(result, Err(RestError::QueryParse { .. })),
            "{}={} should be rejected",
            key,
            value
        );
    }
}

// =============================================================================
// DETERMINISM
// =============================================================================

#[test]
fn test_same_query_same_result() {
    let store = seeded_store();
    let query = [
        ("averageCost[gt]", "7000"),
        ("careers[in]", "UI/UX"),
        ("sort", "-housing,name"),
        ("select", "name,housing"),
        ("page", "2"),
        ("limit", "4"),
    ];

    let first_plan = QueryTranslator::translate(&params(&query)).unwrap();
    let second_plan = QueryTranslator::translate(&params(&query)).unwrap();
    assert_eq!(first_plan, second_plan);

    assert_eq!(run(&store, &query).unwrap(), run(&store, &query).unwrap());
}
