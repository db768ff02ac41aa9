//! The role ladder and promotion thresholds.
//!
//! Roles move upward only. The propagation worker re-evaluates an ancestor's
//! role after every counter change and promotes when both the direct and
//! team thresholds of a higher tier are met; nothing in the engine ever
//! demotes through this path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered role tiers. Derived `Ord` follows declaration order, so
/// `Role::Member < Role::Activist < ... < Role::Leader`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Role {
    /// Every registered member starts here.
    #[default]
    Member,
    /// Brought in a handful of direct referrals.
    Activist,
    /// Sustains a small local network.
    Organizer,
    /// Runs a multi-branch network.
    Coordinator,
    /// Anchors a large regional network.
    Leader,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Member => "member",
            Role::Activist => "activist",
            Role::Organizer => "organizer",
            Role::Coordinator => "coordinator",
            Role::Leader => "leader",
        };
        write!(f, "{}", name)
    }
}

/// Requirements for holding a role tier.
///
/// A member qualifies when `direct_count >= min_direct` AND
/// `team_size >= min_team`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleThreshold {
    pub role: Role,
    pub min_direct: u64,
    pub min_team: u64,
}

/// Ordered table of role thresholds, lowest tier first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionTable {
    rows: Vec<RoleThreshold>,
}

impl PromotionTable {
    /// Build a table from rows. Rows must be sorted by ascending role.
    pub fn new(rows: Vec<RoleThreshold>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].role < w[1].role));
        Self { rows }
    }

    /// The highest role the given counters qualify for.
    pub fn qualified_role(&self, direct_count: u64, team_size: u64) -> Role {
        self.rows
            .iter()
            .filter(|row| direct_count >= row.min_direct && team_size >= row.min_team)
            .map(|row| row.role)
            .max()
            .unwrap_or_default()
    }

    /// The role to promote to, if the counters now qualify for a higher
    /// tier than `current`. Never returns a lower tier.
    pub fn promotion_for(&self, current: Role, direct_count: u64, team_size: u64) -> Option<Role> {
        let qualified = self.qualified_role(direct_count, team_size);
        (qualified > current).then_some(qualified)
    }
}

impl Default for PromotionTable {
    fn default() -> Self {
        Self::new(vec![
            RoleThreshold {
                role: Role::Member,
                min_direct: 0,
                min_team: 0,
            },
            RoleThreshold {
                role: Role::Activist,
                min_direct: 5,
                min_team: 0,
            },
            RoleThreshold {
                role: Role::Organizer,
                min_direct: 10,
                min_team: 50,
            },
            RoleThreshold {
                role: Role::Coordinator,
                min_direct: 25,
                min_team: 250,
            },
            RoleThreshold {
                role: Role::Leader,
                min_direct: 50,
                min_team: 1000,
            },
        ])
    }
}
