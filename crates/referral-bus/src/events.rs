//! # Referral Events
//!
//! Defines all event types that flow through the referral bus.

use referral_types::{EdgeId, MemberId, Role, Timestamp};
use serde::{Deserialize, Serialize};

/// All events that can be published to the referral bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferralEvent {
    /// A referral code was allocated and reserved for a member.
    CodeAllocated {
        /// The code's owner.
        member: MemberId,
        /// The reserved code, normalized form.
        code: String,
        /// Reservation time.
        at: Timestamp,
    },

    /// A referral edge was committed: the referee is now permanently
    /// linked to the referrer.
    ReferralLinked {
        /// Id of the committed edge.
        edge_id: EdgeId,
        /// The member whose code was used.
        referrer: MemberId,
        /// The newly linked member.
        referee: MemberId,
        /// The code value used at join time.
        code_used: String,
        /// Commit time.
        at: Timestamp,
    },

    /// A member crossed a role threshold during propagation.
    RolePromoted {
        /// The promoted member.
        member: MemberId,
        /// Role held before the promotion.
        from: Role,
        /// Role held after the promotion.
        to: Role,
        /// Promotion time.
        at: Timestamp,
    },
}

impl ReferralEvent {
    /// The topic this event belongs to.
    pub fn topic(&self) -> EventTopic {
        match self {
            ReferralEvent::CodeAllocated { .. } => EventTopic::Allocation,
            ReferralEvent::ReferralLinked { .. } => EventTopic::Linking,
            ReferralEvent::RolePromoted { .. } => EventTopic::Promotion,
        }
    }

    /// The member this event is primarily about.
    pub fn subject(&self) -> MemberId {
        match self {
            ReferralEvent::CodeAllocated { member, .. } => *member,
            ReferralEvent::ReferralLinked { referrer, .. } => *referrer,
            ReferralEvent::RolePromoted { member, .. } => *member,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Code allocation events.
    Allocation,
    /// Edge commit events.
    Linking,
    /// Role promotion events.
    Promotion,
}

/// Filter describing which events a subscriber wants.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to receive. `None` means all topics.
    topics: Option<Vec<EventTopic>>,
}

impl EventFilter {
    /// Receive every event.
    pub fn all() -> Self {
        Self { topics: None }
    }

    /// Receive only events on the given topics.
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics: Some(topics),
        }
    }

    /// Whether an event passes this filter.
    pub fn matches(&self, event: &ReferralEvent) -> bool {
        match &self.topics {
            None => true,
            Some(topics) => topics.contains(&event.topic()),
        }
    }

    /// Debug key used for subscription bookkeeping.
    pub(crate) fn topic_key(&self) -> String {
        format!("{:?}", self.topics)
    }
}
