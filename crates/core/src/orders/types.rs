//! Order domain types.

use chrono::{DateTime, Utc};
use gophermart_shared::types::{Amount, OrderId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing status of an uploaded order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Uploaded, not yet seen by the accrual system.
    New,
    /// The accrual system is computing the reward.
    Processing,
    /// Reward computed; terminal.
    Processed,
    /// The accrual system refused the order; terminal.
    Invalid,
}

impl OrderStatus {
    /// Returns the persisted/wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Processing => "PROCESSING",
            Self::Processed => "PROCESSED",
            Self::Invalid => "INVALID",
        }
    }

    /// Parses a status from its persisted representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(Self::New),
            "PROCESSING" => Some(Self::Processing),
            "PROCESSED" => Some(Self::Processed),
            "INVALID" => Some(Self::Invalid),
            _ => None,
        }
    }

    /// Returns true for `PROCESSED` and `INVALID`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Processed | Self::Invalid)
    }

    /// Returns true while the worker still has to poll the order.
    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the worker may move an order from `self` to `target`.
    ///
    /// `PROCESSING -> PROCESSING` is allowed as a refresh. `NEW` is never a
    /// target; terminal states have no successors.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        match self {
            Self::New | Self::Processing => {
                matches!(target, Self::Processing | Self::Processed | Self::Invalid)
            }
            Self::Processed | Self::Invalid => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded purchase order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Internal identifier.
    pub id: OrderId,
    /// Luhn-valid order number, globally unique.
    pub number: String,
    /// Current status.
    pub status: OrderStatus,
    /// Reward credited for this order; only set once `PROCESSED`.
    pub accrual: Option<Amount>,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
    /// Owner.
    pub user_id: UserId,
}

/// Result of a successful order submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new order was stored with status `NEW`.
    Created(Order),
    /// The same user had already uploaded this number; nothing changed.
    AlreadyRegistered(Order),
}

impl SubmitOutcome {
    /// Returns the stored order.
    #[must_use]
    pub const fn order(&self) -> &Order {
        match self {
            Self::Created(order) | Self::AlreadyRegistered(order) => order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ALL: [OrderStatus; 4] = [
        OrderStatus::New,
        OrderStatus::Processing,
        OrderStatus::Processed,
        OrderStatus::Invalid,
    ];

    #[rstest]
    #[case(OrderStatus::New, OrderStatus::Processing, true)]
    #[case(OrderStatus::New, OrderStatus::Processed, true)]
    #[case(OrderStatus::New, OrderStatus::Invalid, true)]
    #[case(OrderStatus::New, OrderStatus::New, false)]
    #[case(OrderStatus::Processing, OrderStatus::Processing, true)]
    #[case(OrderStatus::Processing, OrderStatus::Processed, true)]
    #[case(OrderStatus::Processing, OrderStatus::Invalid, true)]
    #[case(OrderStatus::Processing, OrderStatus::New, false)]
    fn test_transitions(
        #[case] from: OrderStatus,
        #[case] to: OrderStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_terminal_states_have_no_successors() {
        for from in [OrderStatus::Processed, OrderStatus::Invalid] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("REGISTERED"), None);
        assert_eq!(OrderStatus::parse("new"), None);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"PROCESSING\"");
    }
}
