use colored::Colorize;
use std::time::SystemTime;
use thiserror::Error;
use uuid::Uuid;

/* ============================================================
 * State pattern: a food-delivery order
 *
 * Every lifecycle operation is delegated to the current stage
 * object; each stage only knows its own legal transitions.
 * ============================================================
 */

#[derive(Error, Debug, Clone, PartialEq)]
enum OrderError {
    #[error("cannot {action} an order that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },

    #[error("an order that is {status} can no longer be cancelled")]
    CancelBlocked { status: &'static str },

    #[error("order must contain at least one item")]
    EmptyOrder,
}

trait OrderStage {
    fn status(&self) -> &'static str;

    fn prepare(&self) -> Result<Box<dyn OrderStage>, OrderError> {
        Err(OrderError::InvalidTransition {
            action: "prepare",
            status: self.status(),
        })
    }

    fn dispatch(&self) -> Result<Box<dyn OrderStage>, OrderError> {
        Err(OrderError::InvalidTransition {
            action: "dispatch",
            status: self.status(),
        })
    }

    fn complete(&self) -> Result<Box<dyn OrderStage>, OrderError> {
        Err(OrderError::InvalidTransition {
            action: "complete",
            status: self.status(),
        })
    }

    fn can_cancel(&self) -> bool {
        false
    }
}

/* ============================================================
 * Concrete stages
 * ============================================================
 */

struct Placed;
struct Preparing;
struct OutForDelivery;
struct Delivered;
struct Cancelled;

impl OrderStage for Placed {
    fn status(&self) -> &'static str {
        "placed"
    }

    fn prepare(&self) -> Result<Box<dyn OrderStage>, OrderError> {
        println!("kitchen started on the order");
        Ok(Box::new(Preparing))
    }

    fn can_cancel(&self) -> bool {
        true
    }
}

impl OrderStage for Preparing {
    fn status(&self) -> &'static str {
        "preparing"
    }

    fn dispatch(&self) -> Result<Box<dyn OrderStage>, OrderError> {
        println!("courier picked the order up");
        Ok(Box::new(OutForDelivery))
    }

    fn can_cancel(&self) -> bool {
        true
    }
}

impl OrderStage for OutForDelivery {
    fn status(&self) -> &'static str {
        "out for delivery"
    }

    fn complete(&self) -> Result<Box<dyn OrderStage>, OrderError> {
        println!("order handed to the customer");
        Ok(Box::new(Delivered))
    }
}

impl OrderStage for Delivered {
    fn status(&self) -> &'static str {
        "delivered"
    }
}

impl OrderStage for Cancelled {
    fn status(&self) -> &'static str {
        "cancelled"
    }
}

/* ============================================================
 * Context
 * ============================================================
 */

struct Order {
    id: Uuid,
    customer: String,
    items: Vec<String>,
    placed_at: SystemTime,
    stage: Box<dyn OrderStage>,
}

impl Order {
    fn place(customer: impl Into<String>, items: Vec<String>) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        let order = Self {
            id: Uuid::new_v4(),
            customer: customer.into(),
            items,
            placed_at: SystemTime::now(),
            stage: Box::new(Placed),
        };
        println!(
            "order {} placed for {} ({})",
            order.id,
            order.customer,
            order.items.join(", ")
        );
        Ok(order)
    }

    fn status(&self) -> &'static str {
        self.stage.status()
    }

    fn prepare(&mut self) -> Result<(), OrderError> {
        self.advance(self.stage.prepare()?);
        Ok(())
    }

    fn dispatch(&mut self) -> Result<(), OrderError> {
        self.advance(self.stage.dispatch()?);
        Ok(())
    }

    fn complete(&mut self) -> Result<(), OrderError> {
        self.advance(self.stage.complete()?);
        Ok(())
    }

    fn can_cancel(&self) -> bool {
        self.stage.can_cancel()
    }

    fn cancel(&mut self) -> Result<(), OrderError> {
        if !self.stage.can_cancel() {
            return Err(OrderError::CancelBlocked {
                status: self.stage.status(),
            });
        }
        println!("order {} cancelled", self.id);
        self.advance(Box::new(Cancelled));
        Ok(())
    }

    fn advance(&mut self, next: Box<dyn OrderStage>) {
        self.stage = next;
        println!("  stage -> {}", self.status());
    }
}

/* ============================================================
 * Demo (cargo run)
 * ============================================================
 */

fn burger_order() -> Vec<String> {
    vec![
        "Cheeseburger".to_string(),
        "Fries".to_string(),
        "Soda".to_string(),
    ]
}

fn main() {
    println!("== Happy path ==");
    let mut order = Order::place("Joana Silva", burger_order()).unwrap();
    order.prepare().unwrap();
    order.dispatch().unwrap();
    order.complete().unwrap();
    println!("{} final status: {}\n", "ok".green(), order.status());

    println!("== Rule violations are refused ==");
    let mut rushed = Order::place("Marcos Reis", vec!["Pizza".to_string()]).unwrap();
    for attempt in [rushed.dispatch(), rushed.complete()] {
        if let Err(err) = attempt {
            println!("{} {err}", "refused:".red());
        }
    }
    rushed.prepare().unwrap();
    rushed.dispatch().unwrap();
    rushed.complete().unwrap();
    println!("{} recovered with the proper sequence\n", "ok".green());

    println!("== Cancellation rules ==");
    let mut late = Order::place("Pedro Costa", vec!["Salad".to_string()]).unwrap();
    late.prepare().unwrap();
    println!("can cancel while preparing: {}", late.can_cancel());
    late.cancel().unwrap();

    if let Err(err) = order.cancel() {
        println!("{} {err}", "refused:".red());
    }

    println!("\n== Empty basket is rejected up front ==");
    match Order::place("Nobody", vec![]) {
        Err(err) => println!("{} {err}", "refused:".red()),
        Ok(_) => unreachable!(),
    }
}

/* ============================================================
 * Tests (cargo test)
 * ============================================================
 */

#[cfg(test)]
mod tests {
    use super::*;

    fn placed_order() -> Order {
        Order::place("test", vec!["item".to_string()]).unwrap()
    }

    #[test]
    fn full_lifecycle() {
        let mut order = placed_order();
        assert_eq!(order.status(), "placed");
        assert!(order.placed_at <= SystemTime::now());
        order.prepare().unwrap();
        assert_eq!(order.status(), "preparing");
        order.dispatch().unwrap();
        assert_eq!(order.status(), "out for delivery");
        order.complete().unwrap();
        assert_eq!(order.status(), "delivered");
    }

    #[test]
    fn cannot_skip_preparation() {
        let mut order = placed_order();
        assert_eq!(
            order.dispatch(),
            Err(OrderError::InvalidTransition {
                action: "dispatch",
                status: "placed"
            })
        );
        assert!(order.complete().is_err());
        assert_eq!(order.status(), "placed");
    }

    #[test]
    fn cannot_prepare_twice() {
        let mut order = placed_order();
        order.prepare().unwrap();
        assert_eq!(
            order.prepare(),
            Err(OrderError::InvalidTransition {
                action: "prepare",
                status: "preparing"
            })
        );
    }

    #[test]
    fn cancel_window_closes_at_dispatch() {
        let mut order = placed_order();
        assert!(order.can_cancel());
        order.prepare().unwrap();
        assert!(order.can_cancel());
        order.dispatch().unwrap();
        assert!(!order.can_cancel());
        assert_eq!(
            order.cancel(),
            Err(OrderError::CancelBlocked {
                status: "out for delivery"
            })
        );
    }

    #[test]
    fn cancelled_order_is_terminal() {
        let mut order = placed_order();
        order.cancel().unwrap();
        assert_eq!(order.status(), "cancelled");
        assert!(order.prepare().is_err());
        assert!(order.dispatch().is_err());
        assert!(order.complete().is_err());
        assert!(order.cancel().is_err());
    }

    #[test]
    fn delivered_order_cannot_move() {
        let mut order = placed_order();
        order.prepare().unwrap();
        order.dispatch().unwrap();
        order.complete().unwrap();
        assert!(order.prepare().is_err());
        assert!(order.cancel().is_err());
    }

    #[test]
    fn empty_basket_rejected() {
        assert!(matches!(
            Order::place("test", vec![]),
            Err(OrderError::EmptyOrder)
        ));
    }
}
