//! # Referral Bus - Event Bus for Referral Lifecycle Events
//!
//! Carries engine-emitted events to external collaborators (notification
//! delivery, dashboards). Delivery and retry of notifications is entirely
//! the collaborator's concern; the bus only fans events out.
//!
//! ```text
//! ┌──────────────────┐                    ┌────────────────────┐
//! │ Referral Engine  │                    │ Notification svc   │
//! │                  │    publish_now()   │ Dashboard feed     │
//! │                  │ ──────┐            │        ...         │
//! └──────────────────┘       │            └────────────────────┘
//!                            ▼                     ↑
//!                      ┌──────────────┐            │
//!                      │  Event Bus   │ ───────────┘
//!                      └──────────────┘  subscribe()
//! ```
//!
//! Publishing is synchronous (the engine's commit paths are synchronous);
//! receiving is async via `Subscription::recv`.

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, ReferralEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
