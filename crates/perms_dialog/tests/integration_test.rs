//! Integration tests for perms_dialog
//!
//! These tests drive a [`PermissionDialog`] end to end over an in-memory
//! resource source that replays canned endpoint responses from fixture files.
//!
//! # Test Structure
//!
//! - **Editor Tests**: open, edit, save and cancel against fixture nodes
//! - **Row Tests**: checkbox propagation, all-permission styling, filters
//! - **Tree Tests**: lazy loading and idempotent widget initialization
//! - **Hover Tests**: settle delay and quick-preview reveal
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use perms_dialog::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

/// Get the path to a fixture file by name
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

fn fixture_source() -> MemoryResourceSource {
    MemoryResourceSource::new()
        .with_body(None, fixture("resources_root.json"))
        .with_body(Some("home"), fixture("resources_home.json"))
}

fn options() -> DialogOptions {
    DialogOptions::builder()
        .dialog_actions(vec![
            "read".into(),
            "write".into(),
            "execute".into(),
            "activity".into(),
        ])
        .build()
}

fn resource_row(id: u64, filter: Option<&str>) -> RowSpec {
    RowSpec {
        id,
        permission_name: "org.ogema.accesscontrol.ResourcePermission".into(),
        filter: filter.map(str::to_string),
        actions: vec!["read".into(), "write".into(), "delete".into()],
    }
}

/// Dialog with row 1 checked and its tree loaded
async fn loaded_dialog() -> (PermissionDialog, MemoryResourceSource, RowId) {
    let source = fixture_source();
    let mut dialog = PermissionDialog::new(options(), Arc::new(source.clone()));
    let row = dialog.register_row(resource_row(1, Some("path=*,type=Room")));
    assert!(dialog.box_check(row).await.unwrap());
    (dialog, source, row)
}

// ============================================================================
// Editor Tests
// ============================================================================

#[tokio::test]
async fn test_unchecking_write_saves_read() {
    let (mut dialog, _, row) = loaded_dialog().await;
    assert_eq!(dialog.node(row, "home").unwrap().method, "read,write");

    dialog.select_node(row, "home").await.unwrap();
    let checked: Vec<&str> = dialog.state().actions.checked_labels().collect();
    assert_eq!(checked, vec!["read", "write"]);

    dialog.toggle_action("write");
    dialog.save().unwrap();
    assert_eq!(dialog.node(row, "home").unwrap().method, "read");
}

#[tokio::test]
async fn test_checking_execute_on_empty_node() {
    let (mut dialog, _, row) = loaded_dialog().await;
    dialog.select_node(row, "garage").await.unwrap();
    assert_eq!(dialog.state().actions.checked_count(), 0);

    dialog.toggle_action("execute");
    dialog.save().unwrap();
    assert_eq!(dialog.node(row, "garage").unwrap().method, "execute");
}

#[tokio::test]
async fn test_recursive_flag_round_trip() {
    let (mut dialog, _, row) = loaded_dialog().await;

    // "home" carries its payload under "original"
    dialog.select_node(row, "home").await.unwrap();
    assert!(dialog.state().recursive);
    dialog.set_recursive(false);
    dialog.save().unwrap();
    assert!(!dialog.node(row, "home").unwrap().recursive);

    dialog.select_node(row, "garage").await.unwrap();
    dialog.set_recursive(true);
    dialog.save().unwrap();
    assert!(dialog.node(row, "garage").unwrap().recursive);
}

#[tokio::test]
async fn test_cancel_leaves_node_untouched() {
    let (mut dialog, _, row) = loaded_dialog().await;
    dialog.select_node(row, "links").await.unwrap();
    dialog.toggle_action("read");
    dialog.toggle_action("activity");
    dialog.cancel();

    assert_eq!(dialog.node(row, "links").unwrap().method, "read");
    assert!(dialog.state().current.is_none());
    assert!(!dialog.state().open);
}

// ============================================================================
// Row Tests
// ============================================================================

#[tokio::test]
async fn test_master_check_propagates_to_row() {
    let (mut dialog, _, row) = loaded_dialog().await;
    let other = dialog.register_row(resource_row(2, None));

    let controls = dialog.rows().row(row).unwrap();
    assert!(controls.methods.boxes().iter().all(|b| b.checked && b.highlighted));
    assert!(controls.inputs_highlighted && controls.detail_highlighted);
    assert_eq!(dialog.rows().row(other).unwrap().methods.checked_count(), 0);

    dialog.set_children_checked(row, false).unwrap();
    let controls = dialog.rows().row(row).unwrap();
    assert!(controls.methods.boxes().iter().all(|b| !b.checked && !b.highlighted));
    assert!(!controls.detail_highlighted);
    let preview = &dialog.adapter().widget(row).unwrap().preview;
    assert_eq!(preview.checkboxes.checked_count(), 0);
}

#[tokio::test]
async fn test_all_permission_toggles_detail_panel() {
    let mut dialog = PermissionDialog::new(options(), Arc::new(fixture_source()));
    let row = dialog.register_row(resource_row(3, None));

    dialog
        .dispatch(UiEvent::PermissionNameChanged {
            row,
            value: ALL_PERMISSION.into(),
        })
        .await
        .unwrap();
    assert!(!dialog.rows().row(row).unwrap().detail_visible);

    dialog
        .dispatch(UiEvent::PermissionNameChanged {
            row,
            value: "java.io.FilePermission".into(),
        })
        .await
        .unwrap();
    assert!(dialog.rows().row(row).unwrap().detail_visible);
}

#[tokio::test]
async fn test_grant_deny_are_exclusive() {
    let mut dialog = PermissionDialog::new(options(), Arc::new(fixture_source()));
    let row = dialog.register_row(resource_row(4, None));

    dialog.toggle_grant(row).unwrap();
    assert_eq!(dialog.toggle_deny(row).unwrap(), ToggleState::Denied);
    let pair = &dialog.rows().row(row).unwrap().grant_deny;
    assert!(pair.is_denied() && !pair.is_granted());

    assert_eq!(dialog.toggle_deny(row).unwrap(), ToggleState::None);
}

#[tokio::test]
async fn test_missing_filter_queries_empty_fragment() {
    let source = fixture_source();
    let mut dialog = PermissionDialog::new(options(), Arc::new(source.clone()));
    let row = dialog.register_row(resource_row(5, None));
    dialog.customize_permission(row, "customize5").await.unwrap();

    let requests = source.requests().await;
    assert_eq!(requests[0].query, "&action=read,write,delete");
    assert!(dialog.rows().row(row).unwrap().master);
}

#[tokio::test]
async fn test_additional_permissions() {
    let mut dialog = PermissionDialog::new(options(), Arc::new(fixture_source()));
    assert_eq!(dialog.add_additional_permission(3).unwrap(), RowId(311));
    assert_eq!(dialog.add_additional_permission(3).unwrap(), RowId(312));

    assert!(dialog.insert_additional_mask());
    assert!(!dialog.insert_additional_mask());
    dialog
        .set_additional_fields("java.io.FilePermission", "/tmp/*", "read")
        .unwrap();
    dialog.toggle_additional_grant().unwrap();

    let mask = dialog.rows().additional_mask().unwrap();
    assert_eq!(mask.name, "java.io.FilePermission");
    assert!(mask.grant_deny.is_granted());

    assert!(dialog.remove_additional_mask());
    assert!(dialog.insert_additional_mask());
}

// ============================================================================
// Tree Tests
// ============================================================================

#[tokio::test]
async fn test_show_resources_twice_refreshes_one_widget() {
    let (mut dialog, source, row) = loaded_dialog().await;
    dialog.box_check(row).await.unwrap();
    dialog.box_check(row).await.unwrap();

    let widget = dialog.adapter().widget(row).unwrap();
    assert_eq!(widget.loads, 2);
    assert!(widget.visible);

    let requests = source.requests().await;
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.parent == "#"));
    assert_eq!(requests[0].query, "path=*&type=Room&action=read,write,delete");
}

#[tokio::test]
async fn test_lazy_expand_builds_hierarchy() {
    let (mut dialog, source, row) = loaded_dialog().await;
    assert!(dialog.node(row, "home").unwrap().needs_load());

    assert_eq!(dialog.expand(row, "home").await.unwrap(), 2);
    let tree = &dialog.adapter().widget(row).unwrap().tree;
    assert_eq!(tree.children_of("home"), vec!["home/livingroom"]);
    assert_eq!(
        tree.parent_of("home/livingroom/temperature"),
        Some("home/livingroom")
    );
    assert_eq!(tree.get("links").unwrap().kind.icon(), "images/link_small.png");

    let requests = source.requests().await;
    assert_eq!(requests.last().unwrap().parent, "home");
}

#[tokio::test]
async fn test_endpoint_failure_surfaces() {
    let source = MemoryResourceSource::new().with_body(None, "<html>oops</html>");
    let mut dialog = PermissionDialog::new(options(), Arc::new(source));
    let row = dialog.register_row(resource_row(6, None));

    let result = dialog.box_check(row).await;
    assert!(matches!(result, Err(DialogError::JsonDecode(_))));
    assert!(!dialog.select_node(row, "home").await.unwrap());
}

// ============================================================================
// Hover Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_leave_before_delay_never_reveals_preview() {
    let (mut dialog, _, row) = loaded_dialog().await;

    assert!(dialog.hover_enter(row, "home", 80.0));
    tokio::time::sleep(Duration::from_millis(400)).await;
    dialog.hover_leave(row, "home");

    assert_eq!(dialog.settle(Duration::from_secs(3)).await, 0);
    let preview = &dialog.adapter().widget(row).unwrap().preview;
    assert!(!preview.visible);
    assert!(preview.anchor.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_settled_hover_reveals_and_applies_preview() {
    let (mut dialog, _, row) = loaded_dialog().await;

    dialog.hover_enter(row, "links", 200.0);
    assert_eq!(dialog.settle(Duration::from_secs(2)).await, 1);

    let preview = &dialog.adapter().widget(row).unwrap().preview;
    assert!(preview.visible);
    assert_eq!(preview.top, 233.0);
    assert_eq!(preview.caption, "links");
    assert_eq!(preview.checkboxes.encode(), "read");

    dialog.select_node(row, "garage").await.unwrap();
    dialog.toggle_preview_action(row, "activity");
    assert_eq!(dialog.apply_preview(row).unwrap(), "read,activity");
    assert_eq!(dialog.node(row, "garage").unwrap().method, "read,activity");
    assert!(!dialog.adapter().widget(row).unwrap().preview.visible);
}

#[tokio::test(start_paused = true)]
async fn test_moving_between_nodes_reveals_only_the_last() {
    let (mut dialog, _, row) = loaded_dialog().await;

    dialog.hover_enter(row, "home", 0.0);
    tokio::time::sleep(Duration::from_millis(500)).await;
    dialog.hover_leave(row, "home");
    dialog.hover_enter(row, "garage", 40.0);

    assert_eq!(dialog.settle(Duration::from_secs(2)).await, 1);
    let preview = &dialog.adapter().widget(row).unwrap().preview;
    assert_eq!(preview.anchor.as_deref(), Some("garage"));
    assert_eq!(dialog.adapter().pending_hovers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rehover_ignores_timer_of_earlier_visit() {
    let (mut dialog, _, row) = loaded_dialog().await;

    // First visit outlasts the delay but its timer is not drained
    dialog.hover_enter(row, "home", 0.0);
    tokio::time::sleep(Duration::from_millis(1100)).await;
    dialog.hover_leave(row, "home");

    dialog.hover_enter(row, "home", 50.0);
    assert_eq!(dialog.settle(Duration::from_millis(10)).await, 0);
    assert!(!dialog.adapter().widget(row).unwrap().preview.visible);

    assert_eq!(dialog.settle(Duration::from_secs(2)).await, 1);
    let preview = &dialog.adapter().widget(row).unwrap().preview;
    assert!(preview.visible);
    assert_eq!(preview.top, 83.0);
    assert_eq!(preview.anchor.as_deref(), Some("home"));
}
