//! Introspection Tests
//!
//! Registered states and defaults per field, reachable targets, and the
//! process-wide registry.

use crate::*;
use std::sync::Arc;
use stratastate::{value_from_json, StateRegistry};

#[test]
fn test_get_states_per_field() {
    let states = Order::get_states().unwrap();
    assert_eq!(
        states["payment"],
        vec!["pending", "paid", "failed", "refunded"]
    );
    assert_eq!(states["shipping"], vec!["waiting", "shipped", "delivered"]);
    assert_eq!(states.len(), 2);
}

#[test]
fn test_get_states_for_field() {
    assert_eq!(
        Post::get_states_for("status").unwrap(),
        vec!["draft", "published"]
    );
    assert!(matches!(
        Post::get_states_for("title").unwrap_err(),
        StateError::UnknownField { .. }
    ));
}

#[test]
fn test_default_states() {
    let defaults = Order::get_default_states().unwrap();
    assert_eq!(defaults["payment"], Some("pending"));
    assert_eq!(defaults["shipping"], Some("waiting"));

    assert_eq!(Post::get_default_state_for("status").unwrap(), Some("draft"));
    assert_eq!(Ticket::get_default_state_for("priority").unwrap(), None);
    assert!(Note::get_default_states().unwrap().is_empty());
}

#[test]
fn test_unset_field_reads_as_default() {
    let post = Post::default();
    let state = post.state("status").unwrap().unwrap();
    assert!(state.is(PostState::Draft));
    assert_eq!(state.field(), "status");
    assert!(post.get_attribute("status").is_null());

    assert!(Ticket::default().state("priority").unwrap().is_none());
}

#[test]
fn test_transitionable_states_follow_current_state() {
    let mut order = Order::default();
    assert_eq!(
        order.transitionable_states(Some("payment")).unwrap(),
        vec!["paid", "failed"]
    );

    order
        .transition(Some("payment"), PaymentState::Paid, vec![Value::Int(5)])
        .unwrap();
    assert_eq!(
        order.transitionable_states(Some("payment")).unwrap(),
        vec!["failed", "refunded"]
    );
}

#[test]
fn test_can_transition_to_has_no_side_effects() {
    let order = Order::default();
    assert!(order
        .can_transition_to(PaymentState::Failed, Some("payment"))
        .unwrap());
    assert!(order.get_attribute("payment").is_null());
    assert!(order.get_attribute("failure").is_null());
}

#[test]
fn test_registry_shares_one_table_per_type() {
    let first = Post::state_fields().unwrap();
    let second = Post::state_fields().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(StateRegistry::global().contains::<Post>());
    assert_eq!(first.field_names(), vec!["status"]);
}

#[test]
fn test_json_column_as_stored_value() {
    let mut post = Post::stored(value_from_json(serde_json::json!("published")));
    post.deserialize_states().unwrap();
    assert!(post.state("status").unwrap().unwrap().is(PostState::Published));
}
