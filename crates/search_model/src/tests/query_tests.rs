use super::*;

fn values(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|value| value.to_string()).collect()
}

#[test]
fn match_all_starts_on_first_page_with_default_size() {
    let query = QueryValue::match_all();
    assert_eq!(query.text, "");
    assert_eq!(query.page, 1);
    assert_eq!(query.size, DEFAULT_PAGE_SIZE);
    assert!(query.filters.is_empty());
}

#[test]
fn toggle_twice_restores_original_set() {
    let original = values(&["red", "blue"]);
    for clicked in ["red", "green"] {
        let once = toggle_value(clicked, &original);
        let twice = toggle_value(clicked, &once);
        let mut sorted_twice = twice.clone();
        sorted_twice.sort();
        let mut sorted_original = original.clone();
        sorted_original.sort();
        assert_eq!(sorted_twice, sorted_original, "clicked {clicked}");
    }
}

#[test]
fn toggle_removes_active_and_appends_inactive() {
    assert_eq!(toggle_value("red", &values(&["red", "blue"])), values(&["blue"]));
    assert_eq!(
        toggle_value("green", &values(&["red"])),
        values(&["red", "green"])
    );
    assert_eq!(toggle_value("red", &[]), values(&["red"]));
}

#[test]
fn empty_filter_values_remove_the_filter() {
    let mut query = QueryValue::match_all();
    query.filter_by("brand", "brand.id", values(&["nike"]), FilterApplication::MustAll);
    assert_eq!(query.active_filter_values("brand"), values(&["nike"]).as_slice());

    query.filter_by("brand", "brand.id", Vec::new(), FilterApplication::MustAll);
    assert!(query.filters.get("brand").is_none());
    assert!(query.active_filter_values("brand").is_empty());
}

#[test]
fn clone_does_not_alias_nested_collections() {
    let mut original = QueryValue::match_all();
    original.filter_by("color", "color", values(&["red"]), FilterApplication::AtLeastOne);

    let mut clone = original.clone();
    clone
        .filters
        .get_mut("color")
        .expect("filter")
        .values
        .push("blue".into());
    clone.promote(ItemId::new("1", "product"));

    assert_eq!(original.active_filter_values("color"), values(&["red"]).as_slice());
    assert!(original.promoted.is_empty());
}

#[test]
fn promote_and_exclude_deduplicate() {
    let mut query = QueryValue::match_all();
    query.promote(ItemId::new("1", "product"));
    query.promote(ItemId::new("1", "product"));
    query.exclude(ItemId::new("2", "product"));
    query.exclude(ItemId::new("2", "product"));
    assert_eq!(query.promoted.len(), 1);
    assert_eq!(query.excluded.len(), 1);
}

#[test]
fn rejects_page_zero() {
    let mut query = QueryValue::match_all();
    assert_eq!(query.set_page(0), Err(ModelError::InvalidPage(0)));
    query.set_page(4).expect("page");
    assert_eq!(query.page, 4);
}

#[test]
fn deserializes_query_with_missing_optional_sections() {
    let query: QueryValue =
        serde_json::from_str(r#"{"text":"shoes","page":2,"size":20}"#).expect("query json");
    assert_eq!(query.text, "shoes");
    assert_eq!(query.page, 2);
    assert!(query.aggregations.is_empty());
    assert_eq!(query.suggestion_count, None);
}
