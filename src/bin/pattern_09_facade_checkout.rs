use colored::Colorize;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Facade pattern: one-call checkout over stock, payment, notification
// and delivery subsystems
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
enum CheckoutError {
    #[error("product '{product}' is not in the catalog")]
    UnknownProduct { product: String },

    #[error("insufficient stock for '{product}': requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: u32,
        available: u32,
    },

    #[error("payment method '{method}' is not accepted")]
    UnknownPaymentMethod { method: String },

    #[error("payment declined: {reason}")]
    PaymentDeclined { reason: String },
}

#[derive(Debug, Clone)]
struct OrderRequest {
    customer_email: String,
    customer_address: String,
    product: String,
    quantity: u32,
    amount: f64,
    payment_method: String,
}

// =============================================================================
// Subsystem: inventory
// =============================================================================

struct Inventory {
    stock: HashMap<String, u32>,
}

impl Inventory {
    fn seeded() -> Self {
        let mut stock = HashMap::new();
        stock.insert("notebook".to_string(), 40);
        stock.insert("mouse".to_string(), 12);
        stock.insert("keyboard".to_string(), 3);
        Self { stock }
    }

    fn available(&self, product: &str) -> Result<u32, CheckoutError> {
        self.stock
            .get(product)
            .copied()
            .ok_or_else(|| CheckoutError::UnknownProduct {
                product: product.to_string(),
            })
    }

    fn reserve(&mut self, product: &str, quantity: u32) -> Result<u32, CheckoutError> {
        let available = self.available(product)?;
        if available < quantity {
            return Err(CheckoutError::InsufficientStock {
                product: product.to_string(),
                requested: quantity,
                available,
            });
        }
        let remaining = available - quantity;
        self.stock.insert(product.to_string(), remaining);
        println!("  [stock] {product}: {available} -> {remaining}");
        Ok(remaining)
    }
}

// =============================================================================
// Subsystem: payment
// =============================================================================

const ACCEPTED_METHODS: [&str; 4] = ["credit_card", "debit_card", "pix", "boleto"];
const CAPTURE_LIMIT: f64 = 10_000.0;

struct PaymentProcessor;

impl PaymentProcessor {
    fn method_accepted(method: &str) -> bool {
        ACCEPTED_METHODS.contains(&method)
    }

    fn capture(&self, amount: f64, method: &str) -> Result<Uuid, CheckoutError> {
        if !Self::method_accepted(method) {
            return Err(CheckoutError::UnknownPaymentMethod {
                method: method.to_string(),
            });
        }
        if amount <= 0.0 {
            return Err(CheckoutError::PaymentDeclined {
                reason: "amount must be positive".to_string(),
            });
        }
        if amount > CAPTURE_LIMIT {
            return Err(CheckoutError::PaymentDeclined {
                reason: format!("amount above the ${CAPTURE_LIMIT:.0} capture limit"),
            });
        }
        let transaction = Uuid::new_v4();
        println!("  [payment] captured ${amount:.2} via {method} ({transaction})");
        Ok(transaction)
    }
}

// =============================================================================
// Subsystem: notifications
// =============================================================================

const LOW_STOCK_FLOOR: u32 = 10;

struct Notifier;

impl Notifier {
    fn order_confirmation(&self, email: &str, order_id: Uuid) {
        println!("  [notify] confirmation for order {order_id} -> {email}");
    }

    fn low_stock_alert(&self, product: &str, remaining: u32) {
        println!("  [notify] low stock: {product} down to {remaining} units");
    }
}

// =============================================================================
// Subsystem: delivery
// =============================================================================

const DELIVERY_BASE_HOURS: u32 = 24;

struct DeliveryService;

impl DeliveryService {
    /// Deterministic stand-in for a routing estimate: remote-looking
    /// addresses (longer) take longer.
    fn eta_hours(&self, address: &str) -> u32 {
        DELIVERY_BASE_HOURS + (address.len() as u32 % 48)
    }

    fn schedule(&self, order_id: Uuid, address: &str) -> u32 {
        let eta = self.eta_hours(address);
        println!("  [delivery] order {order_id} to '{address}', eta {eta}h");
        eta
    }
}

// =============================================================================
// The facade
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct CheckoutReceipt {
    order_id: Uuid,
    transaction_id: Uuid,
    remaining_stock: u32,
    eta_hours: u32,
}

struct CheckoutFacade {
    inventory: Inventory,
    payments: PaymentProcessor,
    notifier: Notifier,
    delivery: DeliveryService,
}

impl CheckoutFacade {
    fn new() -> Self {
        Self {
            inventory: Inventory::seeded(),
            payments: PaymentProcessor,
            notifier: Notifier,
            delivery: DeliveryService,
        }
    }

    /// The one call a storefront needs. Steps run in a fixed order and
    /// the first refusing subsystem aborts the checkout.
    fn process_order(&mut self, request: &OrderRequest) -> Result<CheckoutReceipt, CheckoutError> {
        let order_id = Uuid::new_v4();
        println!("checkout {order_id}: {}x {}", request.quantity, request.product);

        // stock is checked before money moves
        let available = self.inventory.available(&request.product)?;
        if available < request.quantity {
            return Err(CheckoutError::InsufficientStock {
                product: request.product.clone(),
                requested: request.quantity,
                available,
            });
        }

        let transaction_id = self.payments.capture(request.amount, &request.payment_method)?;
        let remaining_stock = self.inventory.reserve(&request.product, request.quantity)?;

        self.notifier.order_confirmation(&request.customer_email, order_id);
        if remaining_stock < LOW_STOCK_FLOOR {
            self.notifier.low_stock_alert(&request.product, remaining_stock);
        }

        let eta_hours = self.delivery.schedule(order_id, &request.customer_address);

        Ok(CheckoutReceipt {
            order_id,
            transaction_id,
            remaining_stock,
            eta_hours,
        })
    }
}

// =============================================================================
// Demo (cargo run)
// =============================================================================

fn request(product: &str, quantity: u32, amount: f64, method: &str) -> OrderRequest {
    OrderRequest {
        customer_email: "buyer@example.com".to_string(),
        customer_address: "Rua das Flores 123, São Paulo".to_string(),
        product: product.to_string(),
        quantity,
        amount,
        payment_method: method.to_string(),
    }
}

fn main() {
    let mut checkout = CheckoutFacade::new();

    println!("== Successful checkout ==");
    let receipt = checkout.process_order(&request("mouse", 5, 449.50, "pix")).unwrap();
    println!(
        "{} order {} paid ({}), {} left, eta {}h\n",
        "ok".green(),
        receipt.order_id,
        receipt.transaction_id,
        receipt.remaining_stock,
        receipt.eta_hours
    );

    println!("== Low-stock alert fires on the way out ==");
    checkout.process_order(&request("mouse", 2, 179.80, "pix")).unwrap();
    println!();

    println!("== Each subsystem can refuse the order ==");
    let failures = [
        request("gpu", 1, 5000.0, "pix"),
        request("keyboard", 10, 2999.0, "pix"),
        request("notebook", 1, 2500.0, "cheque"),
        request("notebook", 6, 15_000.0, "credit_card"),
    ];
    for bad in failures {
        match checkout.process_order(&bad) {
            Err(err) => println!("{} {err}", "refused:".red()),
            Ok(_) => unreachable!(),
        }
    }
}

// =============================================================================
// Tests (cargo test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_produces_a_full_receipt() {
        let mut checkout = CheckoutFacade::new();
        let receipt = checkout.process_order(&request("notebook", 2, 5000.0, "credit_card")).unwrap();
        assert_eq!(receipt.remaining_stock, 38);
        assert!(receipt.eta_hours >= DELIVERY_BASE_HOURS);
    }

    #[test]
    fn stock_is_checked_before_payment() {
        let mut checkout = CheckoutFacade::new();
        // would also be a declined payment, but stock refuses first
        let err = checkout
            .process_order(&request("keyboard", 50, 99_999.0, "credit_card"))
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InsufficientStock { available: 3, .. }));
    }

    #[test]
    fn unknown_product() {
        let mut checkout = CheckoutFacade::new();
        assert!(matches!(
            checkout.process_order(&request("gpu", 1, 100.0, "pix")),
            Err(CheckoutError::UnknownProduct { .. })
        ));
    }

    #[test]
    fn failed_checkout_leaves_stock_untouched() {
        let mut checkout = CheckoutFacade::new();
        checkout.process_order(&request("mouse", 1, 90.0, "cheque")).unwrap_err();
        assert_eq!(checkout.inventory.available("mouse").unwrap(), 12);
    }

    #[test]
    fn payment_method_whitelist() {
        assert!(PaymentProcessor::method_accepted("pix"));
        assert!(!PaymentProcessor::method_accepted("cheque"));
    }

    #[test]
    fn capture_limits() {
        let payments = PaymentProcessor;
        assert!(payments.capture(100.0, "pix").is_ok());
        assert!(matches!(
            payments.capture(0.0, "pix"),
            Err(CheckoutError::PaymentDeclined { .. })
        ));
        assert!(matches!(
            payments.capture(10_001.0, "pix"),
            Err(CheckoutError::PaymentDeclined { .. })
        ));
    }

    #[test]
    fn reserve_decrements_and_refuses_overdraw() {
        let mut inventory = Inventory::seeded();
        assert_eq!(inventory.reserve("keyboard", 2).unwrap(), 1);
        assert!(matches!(
            inventory.reserve("keyboard", 2),
            Err(CheckoutError::InsufficientStock { available: 1, .. })
        ));
    }

    #[test]
    fn delivery_eta_is_deterministic_per_address() {
        let delivery = DeliveryService;
        let a = delivery.eta_hours("short st");
        assert_eq!(a, delivery.eta_hours("short st"));
        assert!(a >= DELIVERY_BASE_HOURS && a < DELIVERY_BASE_HOURS + 48);
    }
}
