use super::*;

fn node(id: &str, name: &str, parent_id: Option<&str>) -> CategoryNode {
    CategoryNode {
        id: id.to_string(),
        name: name.to_string(),
        parent_category_id: parent_id.map(str::to_string),
        parent_category: None,
    }
}

fn embedded(id: &str, name: &str, parent: Option<CategoryNode>) -> CategoryNode {
    CategoryNode {
        id: id.to_string(),
        name: name.to_string(),
        parent_category_id: parent.as_ref().map(|p| p.id.clone()),
        parent_category: parent.map(Box::new),
    }
}

#[test]
fn root_category_path_is_its_own_name() {
    let root = embedded("pcat_a", "Film", None);
    assert_eq!(build_category_path(&root).unwrap(), "Film");
}

#[test]
fn embedded_chain_builds_root_to_leaf_path() {
    let a = embedded("pcat_a", "A", None);
    let b = embedded("pcat_b", "B", Some(a));
    let c = embedded("pcat_c", "C", Some(b));
    assert_eq!(build_category_path(&c).unwrap(), "A > B > C");
}

#[test]
fn embedded_chain_with_repeated_id_is_a_cycle() {
    let inner = embedded("pcat_a", "A", None);
    let looped = embedded("pcat_b", "B", Some(inner));
    let outer = embedded("pcat_a", "A", Some(looped));
    let err = build_category_path(&outer).unwrap_err();
    assert!(
        matches!(err, CategoryError::Cycle { ref id, .. } if id == "pcat_a"),
        "expected Cycle at pcat_a, got: {err:?}"
    );
}

#[test]
fn index_resolves_parent_ids_to_full_paths() {
    let categories = vec![
        node("pcat_3", "Point&Shoot", Some("pcat_2")),
        node("pcat_1", "Film", None),
        node("pcat_2", "35mm", Some("pcat_1")),
    ];
    let index = CategoryIndex::build(&categories).unwrap();

    assert_eq!(index.len(), 3);
    assert_eq!(index.lookup("film"), Some("pcat_1"));
    assert_eq!(index.lookup("film > 35mm"), Some("pcat_2"));
    assert_eq!(index.lookup("film > 35mm > point&shoot"), Some("pcat_3"));
}

#[test]
fn lookup_ignores_case_and_surrounding_whitespace() {
    let categories = vec![
        node("pcat_1", "Film", None),
        node("pcat_2", "35Mm", Some("pcat_1")),
    ];
    let index = CategoryIndex::build(&categories).unwrap();

    assert_eq!(index.lookup("film > 35mm"), Some("pcat_2"));
    assert_eq!(index.lookup("FILM > 35MM"), Some("pcat_2"));
    assert_eq!(index.lookup("  Film > 35Mm "), Some("pcat_2"));
    assert_eq!(index.lookup("film > 120"), None);
}

#[test]
fn index_includes_parents_that_are_only_embedded() {
    let film = embedded("pcat_1", "Film", None);
    let categories = vec![embedded("pcat_2", "35mm", Some(film))];
    let index = CategoryIndex::build(&categories).unwrap();

    assert_eq!(index.len(), 2);
    assert_eq!(index.lookup("film"), Some("pcat_1"));
    assert_eq!(index.lookup("film > 35mm"), Some("pcat_2"));
}

#[test]
fn index_fails_fast_on_cyclic_parent_ids() {
    let categories = vec![
        node("pcat_1", "A", Some("pcat_2")),
        node("pcat_2", "B", Some("pcat_1")),
    ];
    let err = CategoryIndex::build(&categories).unwrap_err();
    assert!(
        matches!(err, CategoryError::Cycle { .. }),
        "expected Cycle, got: {err:?}"
    );
}

#[test]
fn index_fails_fast_on_self_parent() {
    let categories = vec![node("pcat_1", "A", Some("pcat_1"))];
    let err = CategoryIndex::build(&categories).unwrap_err();
    assert!(matches!(err, CategoryError::Cycle { ref id, .. } if id == "pcat_1"));
}

#[test]
fn index_reports_dangling_parent_id() {
    let categories = vec![node("pcat_2", "35mm", Some("pcat_missing"))];
    let err = CategoryIndex::build(&categories).unwrap_err();
    assert_eq!(
        err,
        CategoryError::MissingParent {
            id: "pcat_2".to_string(),
            parent_id: "pcat_missing".to_string(),
        }
    );
}

#[test]
fn duplicate_paths_keep_the_later_category() {
    let categories = vec![
        node("pcat_1", "Film", None),
        node("pcat_2", "film", None),
    ];
    let index = CategoryIndex::build(&categories).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index.lookup("Film"), Some("pcat_2"));
}

#[test]
fn paths_are_sorted_and_lower_cased() {
    let categories = vec![
        node("pcat_2", "Digital", None),
        node("pcat_1", "Film", None),
        node("pcat_3", "35mm", Some("pcat_1")),
    ];
    let index = CategoryIndex::build(&categories).unwrap();
    assert_eq!(
        index.paths(),
        vec![
            ("digital", "pcat_2"),
            ("film", "pcat_1"),
            ("film > 35mm", "pcat_3"),
        ]
    );
}

#[test]
fn category_node_deserializes_api_shape() {
    let raw = serde_json::json!({
        "id": "pcat_2",
        "name": "35mm",
        "handle": "35mm",
        "parent_category_id": "pcat_1",
        "parent_category": {
            "id": "pcat_1",
            "name": "Film",
            "parent_category_id": null,
            "parent_category": null
        }
    });
    let parsed: CategoryNode = serde_json::from_value(raw).unwrap();
    assert_eq!(parsed.parent_id(), Some("pcat_1"));
    assert_eq!(build_category_path(&parsed).unwrap(), "Film > 35mm");
}

#[test]
fn empty_snapshot_builds_empty_index() {
    let index = CategoryIndex::build(&[]).unwrap();
    assert!(index.is_empty());
    assert_eq!(index.lookup("film"), None);
}
