//! Order models and the status transition rules

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle status
///
/// `Cancelled` is reachable from any status, and an order can leave
/// `Cancelled` again (reinstatement). The database stores the lowercase
/// string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Stock side effect required by a status transition
///
/// Cancelling an order hands its reserved stock back; reinstating a
/// cancelled order must reserve it again. Every other transition leaves
/// stock untouched, and a same-status transition is a pure no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    None,
    /// Return the order's quantities to product stock
    Release,
    /// Take the order's quantities from product stock again
    Reserve,
}

impl StockEffect {
    pub fn for_transition(from: OrderStatus, to: OrderStatus) -> Self {
        if from == to {
            return Self::None;
        }
        match (from, to) {
            (_, OrderStatus::Cancelled) => Self::Release,
            (OrderStatus::Cancelled, _) => Self::Reserve,
            _ => Self::None,
        }
    }
}

/// Order entity (database row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Total at creation time, Σ quantity × snapshot price
    pub total: Decimal,
    /// Status as stored (`pending` / ... / `cancelled`)
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn status(&self) -> Option<OrderStatus> {
        OrderStatus::from_db(&self.status)
    }
}

/// Order line entity (database row); `price` is the unit price snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Order with its lines, as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl OrderView {
    /// Recompute the total from the lines (must equal `order.total` for
    /// a freshly created order)
    pub fn computed_total(&self) -> Decimal {
        self.lines.iter().map(OrderLine::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_db_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_db(status.as_db()), Some(status));
        }
    }

    #[test]
    fn test_status_from_db_rejects_unknown() {
        assert_eq!(OrderStatus::from_db("canceled"), None);
        assert_eq!(OrderStatus::from_db("PENDING"), None);
        assert_eq!(OrderStatus::from_db(""), None);
    }

    #[test]
    fn test_same_status_is_noop() {
        for status in OrderStatus::ALL {
            assert_eq!(
                StockEffect::for_transition(status, status),
                StockEffect::None
            );
        }
    }

    #[test]
    fn test_entering_cancelled_releases() {
        for from in OrderStatus::ALL {
            if from == OrderStatus::Cancelled {
                continue;
            }
            assert_eq!(
                StockEffect::for_transition(from, OrderStatus::Cancelled),
                StockEffect::Release
            );
        }
    }

    #[test]
    fn test_leaving_cancelled_reserves() {
        for to in OrderStatus::ALL {
            if to == OrderStatus::Cancelled {
                continue;
            }
            assert_eq!(
                StockEffect::for_transition(OrderStatus::Cancelled, to),
                StockEffect::Reserve
            );
        }
    }

    #[test]
    fn test_plain_transitions_touch_nothing() {
        // exhaustive over the non-cancelled pairs
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                if from == OrderStatus::Cancelled || to == OrderStatus::Cancelled || from == to {
                    continue;
                }
                assert_eq!(
                    StockEffect::for_transition(from, to),
                    StockEffect::None,
                    "{from:?} -> {to:?}"
                );
            }
        }
    }

    fn line(qty: i32, price: Decimal) -> OrderLine {
        OrderLine {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity: qty,
            price,
        }
    }

    #[test]
    fn test_line_total() {
        let l = line(4, Decimal::new(250, 2)); // 4 x 2.50
        assert_eq!(l.line_total(), Decimal::new(1000, 2));
    }

    #[test]
    fn test_order_view_total_sums_lines() {
        let order = Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            total: Decimal::new(3500, 2),
            status: "pending".into(),
            created_at: 0,
            updated_at: 0,
        };
        let view = OrderView {
            order,
            lines: vec![
                line(2, Decimal::new(1000, 2)), // 20.00
                line(3, Decimal::new(500, 2)),  // 15.00
            ],
        };
        assert_eq!(view.computed_total(), Decimal::new(3500, 2));
        assert_eq!(view.computed_total(), view.order.total);
    }

    #[test]
    fn test_order_status_accessor() {
        let mut order = Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            total: Decimal::ZERO,
            status: "shipped".into(),
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(order.status(), Some(OrderStatus::Shipped));
        order.status = "gone".into();
        assert_eq!(order.status(), None);
    }
}
