//! End-to-end catalog scenarios: built-in and extension categories, live
//! sources, filters, and run orchestration.

use std::sync::Arc;

use serde_json::json;

use catalog_core::EntityDescriptor;
use catalog_entity::builtin::{WebLink, builtin_api_version};
use catalog_registry::{CatalogRunEvent, FnHook, ItemsOptions, ObservableList, RunOutcome, SourceItem};

use crate::helpers::{TestCatalog, WIDGET_API, Widget, widget, widget_category};

fn web_link(uid: &str, url: &str) -> EntityDescriptor {
    EntityDescriptor::new(builtin_api_version(), "WebLink", uid, uid).with_spec(json!({ "url": url }))
}

#[test]
fn test_widget_scenario_preserves_identity() {
    let catalog = TestCatalog::new();
    catalog.categories.add(widget_category());

    let s1 = ObservableList::from_items(vec![widget("w1", "first", "available").into()]);
    catalog.entities.add_observable_source("s1", s1.clone());

    let items = catalog.entities.items();
    assert_eq!(items.len(), 1);
    let first = Arc::clone(&items[0]);
    assert_eq!(first.get_id(), "w1");
    assert!(first.is::<Widget>());

    s1.replace(vec![widget("w1", "first", "error").into()]);

    let items = catalog.entities.items();
    assert_eq!(items.len(), 1);
    assert!(Arc::ptr_eq(&first, &items[0]));
    assert_eq!(first.status().phase, "error");
}

#[test]
fn test_extension_category_arrives_after_its_entities() {
    let catalog = TestCatalog::new();
    let extension = ObservableList::from_items(vec![
        widget("w1", "first", "available").into(),
        web_link("docs", "https://docs.example.dev").into(),
    ]);
    catalog.entities.add_observable_source("extension", extension);

    let uids: Vec<String> = catalog.entities.items().iter().map(|e| e.get_id().to_string()).collect();
    assert_eq!(uids, vec!["docs".to_string()]);
    assert_eq!(catalog.entities.unresolved_count(), 1);

    let registration = catalog.categories.add(widget_category());
    let uids: Vec<String> = catalog.entities.items().iter().map(|e| e.get_id().to_string()).collect();
    assert_eq!(uids, vec!["w1".to_string(), "docs".to_string()]);
    assert_eq!(catalog.entities.unresolved_count(), 0);

    let widgets = catalog
        .entities
        .get_items_for_api_kind(WIDGET_API, "Widget", ItemsOptions::default());
    assert_eq!(widgets.len(), 1);

    registration.dispose();
    let uids: Vec<String> = catalog.entities.items().iter().map(|e| e.get_id().to_string()).collect();
    assert_eq!(uids, vec!["docs".to_string()]);
}

#[test]
fn test_sources_merge_and_filters_combine() {
    let catalog = TestCatalog::new();
    catalog.categories.add(widget_category());

    catalog.entities.add_observable_source(
        "local",
        ObservableList::from_items(vec![
            widget("w1", "one", "available").with_source("local").into(),
            widget("w2", "two", "error").with_source("local").into(),
        ]),
    );
    catalog.entities.add_computed_source("remote", || {
        vec![
            SourceItem::from(widget("w3", "three", "available").with_source("remote")),
            SourceItem::from(widget("w2", "two", "available").with_source("remote")),
        ]
    });

    let items = catalog.entities.items();
    assert_eq!(items.len(), 3);
    let w2 = catalog.entities.get_by_id("w2").unwrap();
    assert_eq!(w2.status().phase, "available");
    assert_eq!(w2.metadata().source.as_deref(), Some("remote"));

    let available = catalog
        .entities
        .add_catalog_filter(|e| e.status().phase == "available");
    let remote = catalog
        .entities
        .add_catalog_filter(|e| e.metadata().source.as_deref() == Some("remote"));

    let filtered: Vec<String> = catalog
        .entities
        .filtered_items()
        .iter()
        .map(|e| e.get_id().to_string())
        .collect();
    assert_eq!(filtered, vec!["w2".to_string(), "w3".to_string()]);

    remote.dispose();
    available.dispose();
    available.dispose();
    assert_eq!(catalog.entities.filtered_items().len(), 3);

    assert!(catalog.entities.remove_source("remote"));
    let w2 = catalog.entities.get_by_id("w2").unwrap();
    assert_eq!(w2.status().phase, "error");
    assert!(catalog.entities.get_by_id("w3").is_none());
}

#[tokio::test]
async fn test_run_navigates_unless_prevented() {
    let catalog = TestCatalog::new();
    catalog.categories.add(widget_category());
    catalog.entities.add_observable_source(
        "links",
        ObservableList::from_items(vec![
            web_link("docs", "https://docs.example.dev").into(),
            widget("w1", "first", "available").into(),
        ]),
    );

    let docs = catalog.entities.get_by_id("docs").unwrap();
    assert!(docs.is::<WebLink>());
    assert_eq!(catalog.entities.on_run(&docs).await, RunOutcome::Completed);

    let veto = catalog.entities.add_on_before_run(Arc::new(FnHook::new(
        "widgets-only",
        |event: &mut CatalogRunEvent| {
            if event.target().kind() != "Widget" {
                event.prevent_default();
            }
            Ok(())
        },
    )));

    let outcome = catalog.entities.on_run(&docs).await;
    assert_eq!(
        outcome,
        RunOutcome::Prevented {
            by: Some("widgets-only".to_string())
        }
    );

    let w1 = catalog.entities.get_by_id("w1").unwrap();
    assert_eq!(catalog.entities.on_run(&w1).await, RunOutcome::Completed);

    veto.dispose();
    assert_eq!(catalog.entities.on_run(&docs).await, RunOutcome::Completed);

    assert_eq!(
        catalog.navigator.visited(),
        vec![
            "https://docs.example.dev".to_string(),
            "/widgets/w1".to_string(),
            "https://docs.example.dev".to_string(),
        ]
    );
}

#[test]
fn test_context_menu_of_builtin_link() {
    let catalog = TestCatalog::new();
    catalog.entities.add_observable_source(
        "links",
        ObservableList::from_items(vec![web_link("docs", "https://docs.example.dev").into()]),
    );

    let docs = catalog.entities.get_by_id("docs").unwrap();
    let menu = catalog.entities.on_context_menu_open(&docs);
    assert_eq!(menu.len(), 1);

    (menu[0].on_click)();
    assert_eq!(catalog.navigator.visited(), vec!["https://docs.example.dev".to_string()]);
}
