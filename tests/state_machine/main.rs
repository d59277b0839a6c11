//! State Machine Integration Test Suite
//!
//! Exercises the `HasStates` facade end to end against small record types:
//! a blog post with one state field, an order with two, a ticket whose only
//! field has no default and a note with no state fields at all.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test state_machine
//!
//! # Run lifecycle tests only, with logs
//! RUST_LOG=debug cargo test --test state_machine lifecycle::
//! ```

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use stratastate::prelude::*;
use tracing_subscriber::EnvFilter;

// Test modules
pub mod introspection;
pub mod lifecycle;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Install a test subscriber once per binary; filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Every `StateChanged` delivered to the order listener
static ORDER_EVENTS: Lazy<Mutex<Vec<StateChanged>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Events recorded for one order, in delivery order
pub fn order_events(order: &Order) -> Vec<StateChanged> {
    let key = order.record_key();
    ORDER_EVENTS
        .lock()
        .iter()
        .filter(|e| e.record_key == key)
        .cloned()
        .collect()
}

macro_rules! document_record {
    ($name:ident) => {
        impl Record for $name {
            fn record_key(&self) -> Option<String> {
                self.doc.record_key()
            }

            fn get_attribute(&self, field: &str) -> Attribute {
                self.doc.get_attribute(field)
            }

            fn set_attribute(&mut self, field: &str, value: Attribute) {
                self.doc.set_attribute(field, value)
            }
        }
    };
}

// =============================================================================
// POST: one field, default, guarded transition
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostState {
    Draft,
    Published,
}

impl StateSet for PostState {
    fn all() -> &'static [Self] {
        &[PostState::Draft, PostState::Published]
    }

    fn name(&self) -> &'static str {
        match self {
            PostState::Draft => "draft",
            PostState::Published => "published",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Post {
    pub doc: Document,
}

impl Post {
    pub fn titled(title: &str) -> Self {
        Self {
            doc: Document::new().with("title", title),
        }
    }

    /// A post as loaded from storage, with a raw status column
    pub fn stored(status: Value) -> Self {
        Self {
            doc: Document::new().with("title", "Stored").with("status", status),
        }
    }
}

document_record!(Post);

/// Publishes a post that has a title; records who published it.
pub struct PublishTransition {
    from: State,
    publisher: Option<Value>,
}

impl PublishTransition {
    pub fn new(ctx: TransitionContext) -> Self {
        Self {
            publisher: ctx.arg(0).cloned(),
            from: ctx.from,
        }
    }
}

impl Transition<Post> for PublishTransition {
    fn can_transition(&self, post: &Post) -> bool {
        !post.get_attribute("title").is_null()
    }

    fn handle(self: Box<Self>, post: &mut Post) -> Result<State> {
        if let Some(publisher) = self.publisher {
            post.set_attribute("published_by", Attribute::Value(publisher));
        }
        Ok(self.from.transition_to(PostState::Published))
    }
}

impl HasStates for Post {
    fn register_states(fields: &mut StateFields<Self>) -> Result<()> {
        fields
            .add_state("status", StateFamily::of::<PostState>())?
            .default(PostState::Draft)?
            .allow_transition(PostState::Draft, PostState::Published, PublishTransition::new)?;
        Ok(())
    }
}

// =============================================================================
// ORDER: two fields, any-from transitions, listener
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl StateSet for PaymentState {
    fn all() -> &'static [Self] {
        &[
            PaymentState::Pending,
            PaymentState::Paid,
            PaymentState::Failed,
            PaymentState::Refunded,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            PaymentState::Pending => "pending",
            PaymentState::Paid => "paid",
            PaymentState::Failed => "failed",
            PaymentState::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingState {
    Waiting,
    Shipped,
    Delivered,
}

impl StateSet for ShippingState {
    fn all() -> &'static [Self] {
        &[
            ShippingState::Waiting,
            ShippingState::Shipped,
            ShippingState::Delivered,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            ShippingState::Waiting => "waiting",
            ShippingState::Shipped => "shipped",
            ShippingState::Delivered => "delivered",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Order {
    pub doc: Document,
}

document_record!(Order);

/// Takes a positive amount as first argument and stores it.
pub struct Pay {
    from: State,
    amount: Option<i64>,
}

impl Transition<Order> for Pay {
    fn handle(self: Box<Self>, order: &mut Order) -> Result<State> {
        match self.amount {
            Some(amount) if amount > 0 => {
                order.set_attribute("paid_amount", Attribute::Value(Value::Int(amount)));
                Ok(self.from.transition_to(PaymentState::Paid))
            }
            _ => Err(StateError::transition_failed("amount must be positive")),
        }
    }
}

/// Exact `pending -> failed`: the card was declined before any charge.
pub struct Decline {
    from: State,
}

impl Transition<Order> for Decline {
    fn handle(self: Box<Self>, order: &mut Order) -> Result<State> {
        order.set_attribute("failure", Attribute::from("declined"));
        Ok(self.from.transition_to(PaymentState::Failed))
    }
}

/// Any-from `* -> failed`.
pub struct FailPayment {
    from: State,
}

impl Transition<Order> for FailPayment {
    fn handle(self: Box<Self>, order: &mut Order) -> Result<State> {
        order.set_attribute("failure", Attribute::from("failed after payment"));
        Ok(self.from.transition_to(PaymentState::Failed))
    }
}

impl HasStates for Order {
    fn register_states(fields: &mut StateFields<Self>) -> Result<()> {
        fields
            .add_state("payment", StateFamily::of::<PaymentState>())?
            .default(PaymentState::Pending)?
            .allow_transition(PaymentState::Pending, PaymentState::Paid, |ctx| Pay {
                amount: ctx.arg(0).and_then(Value::as_int),
                from: ctx.from,
            })?
            .allow_transition(PaymentState::Pending, PaymentState::Failed, |ctx| Decline {
                from: ctx.from,
            })?
            .allow_transition_from_any(PaymentState::Failed, |ctx| FailPayment {
                from: ctx.from,
            })?
            .allow_default_transition(PaymentState::Failed, PaymentState::Paid)?
            .allow_default_transition(PaymentState::Paid, PaymentState::Refunded)?;

        fields
            .add_state("shipping", StateFamily::of::<ShippingState>())?
            .default(ShippingState::Waiting)?
            .allow_default_transition(ShippingState::Waiting, ShippingState::Shipped)?
            .allow_default_transition(ShippingState::Shipped, ShippingState::Delivered)?;

        fields.on_state_changed(|event| ORDER_EVENTS.lock().push(event.clone()));
        Ok(())
    }
}

// =============================================================================
// TICKET: one field, no default
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    High,
}

impl StateSet for Priority {
    fn all() -> &'static [Self] {
        &[Priority::Low, Priority::High]
    }

    fn name(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ticket {
    pub doc: Document,
}

document_record!(Ticket);

impl HasStates for Ticket {
    fn register_states(fields: &mut StateFields<Self>) -> Result<()> {
        fields
            .add_state("priority", StateFamily::of::<Priority>())?
            .allow_default_transition(Priority::Low, Priority::High)?;
        Ok(())
    }
}

// =============================================================================
// NOTE: no state fields
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Note {
    pub doc: Document,
}

document_record!(Note);

impl HasStates for Note {
    fn register_states(_fields: &mut StateFields<Self>) -> Result<()> {
        Ok(())
    }
}
