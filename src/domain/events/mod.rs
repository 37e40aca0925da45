//! Domain events
use crate::domain::value_objects::Quantity;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Cart(CartEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    Created { user_id: Uuid },
    ItemAdded { user_id: Uuid, artwork_id: Uuid, quantity: Quantity, price_at_time: Decimal },
    QuantitySet { user_id: Uuid, artwork_id: Uuid, quantity: Quantity },
    ItemRemoved { user_id: Uuid, artwork_id: Uuid },
    Cleared { user_id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, user_id: Uuid, total: Decimal, payment_reference: Option<String> },
    Recorded { order_id: Uuid, user_id: Uuid, total: Decimal },
}

impl DomainEvent {
    /// Message subject the event is published under.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Cart(CartEvent::Created { .. }) => "marketplace.carts.created",
            Self::Cart(CartEvent::ItemAdded { .. }) => "marketplace.carts.item_added",
            Self::Cart(CartEvent::QuantitySet { .. }) => "marketplace.carts.quantity_set",
            Self::Cart(CartEvent::ItemRemoved { .. }) => "marketplace.carts.item_removed",
            Self::Cart(CartEvent::Cleared { .. }) => "marketplace.carts.cleared",
            Self::Order(OrderEvent::Placed { .. }) => "marketplace.orders.placed",
            Self::Order(OrderEvent::Recorded { .. }) => "marketplace.orders.recorded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let e = DomainEvent::Cart(CartEvent::Cleared { user_id: Uuid::nil() });
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["aggregate"], "cart");
        assert_eq!(json["event"]["type"], "cleared");
        assert_eq!(e.subject(), "marketplace.carts.cleared");
    }
}
