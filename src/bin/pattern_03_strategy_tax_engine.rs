use colored::Colorize;
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Strategy pattern: interchangeable tax rules behind one trait
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
enum TaxError {
    #[error("no tax strategy configured on the calculator")]
    StrategyNotSet,

    #[error("unknown tax kind '{kind}' (supported: {supported})")]
    UnknownKind { kind: String, supported: String },
}

trait TaxStrategy: std::fmt::Debug {
    fn name(&self) -> &'static str;
    fn rate(&self) -> f64;

    fn calculate(&self, amount: f64) -> f64 {
        amount * self.rate()
    }
}

// =============================================================================
// Concrete strategies
// =============================================================================

#[derive(Debug)]
struct Icms;
#[derive(Debug)]
struct Iss;
#[derive(Debug)]
struct Ipi;
#[derive(Debug)]
struct Iva;

impl TaxStrategy for Icms {
    fn name(&self) -> &'static str {
        "ICMS"
    }

    fn rate(&self) -> f64 {
        0.04
    }
}

impl TaxStrategy for Iss {
    fn name(&self) -> &'static str {
        "ISS"
    }

    fn rate(&self) -> f64 {
        0.11
    }
}

impl TaxStrategy for Ipi {
    fn name(&self) -> &'static str {
        "IPI"
    }

    fn rate(&self) -> f64 {
        0.15
    }
}

impl TaxStrategy for Iva {
    fn name(&self) -> &'static str {
        "IVA"
    }

    fn rate(&self) -> f64 {
        0.28
    }
}

// =============================================================================
// Factory for strategies, keyed by a short tag
// =============================================================================

struct TaxStrategyFactory;

impl TaxStrategyFactory {
    fn create(kind: &str) -> Result<Box<dyn TaxStrategy>, TaxError> {
        match kind {
            "ICMS" => Ok(Box::new(Icms)),
            "ISS" => Ok(Box::new(Iss)),
            "IPI" => Ok(Box::new(Ipi)),
            "IVA" => Ok(Box::new(Iva)),
            other => Err(TaxError::UnknownKind {
                kind: other.to_string(),
                supported: Self::supported().join(", "),
            }),
        }
    }

    fn supported() -> Vec<&'static str> {
        vec!["ICMS", "ISS", "IPI", "IVA"]
    }
}

// =============================================================================
// Context
// =============================================================================

#[derive(Default)]
struct TaxCalculator {
    strategy: Option<Box<dyn TaxStrategy>>,
}

impl TaxCalculator {
    fn with_strategy(&mut self, strategy: Box<dyn TaxStrategy>) -> &mut Self {
        self.strategy = Some(strategy);
        self
    }

    fn calculate(&self, amount: f64) -> Result<f64, TaxError> {
        let strategy = self.strategy.as_ref().ok_or(TaxError::StrategyNotSet)?;
        Ok(strategy.calculate(amount))
    }

    fn rate_percent(&self) -> Result<f64, TaxError> {
        let strategy = self.strategy.as_ref().ok_or(TaxError::StrategyNotSet)?;
        Ok(strategy.rate() * 100.0)
    }
}

/// What the demo (and any caller) gets back for a single assessment.
#[derive(Debug, Serialize, PartialEq)]
struct TaxBreakdown {
    tax_kind: &'static str,
    rate_percent: f64,
    amount: f64,
    tax_due: f64,
    total: f64,
}

struct TaxController {
    calculator: TaxCalculator,
}

impl TaxController {
    fn new() -> Self {
        Self {
            calculator: TaxCalculator::default(),
        }
    }

    fn assess(&mut self, kind: &str, amount: f64) -> Result<TaxBreakdown, TaxError> {
        let strategy = TaxStrategyFactory::create(kind)?;
        let name = strategy.name();
        self.calculator.with_strategy(strategy);

        let tax_due = self.calculator.calculate(amount)?;
        Ok(TaxBreakdown {
            tax_kind: name,
            rate_percent: self.calculator.rate_percent()?,
            amount,
            tax_due,
            total: amount + tax_due,
        })
    }
}

// =============================================================================
// Demo (cargo run)
// =============================================================================

fn main() {
    let mut controller = TaxController::new();

    let cases = [
        ("ICMS", 1000.0),
        ("ISS", 2000.0),
        ("IPI", 500.0),
        ("IVA", 1500.0),
        ("PAYROLL", 1000.0), // unsupported on purpose
    ];

    for (kind, amount) in cases {
        println!("-- assessing {kind} on ${amount:.2} --");
        match controller.assess(kind, amount) {
            Ok(breakdown) => {
                println!("{}", "assessed".green());
                // structured output so the record can be piped elsewhere
                println!("{}", serde_json::to_string_pretty(&breakdown).unwrap());
            }
            Err(err) => println!("{} {err}", "error:".red()),
        }
        println!();
    }

    println!("== Same amount under every strategy ==");
    let amount = 1000.0;
    for kind in TaxStrategyFactory::supported() {
        let breakdown = controller.assess(kind, amount).unwrap();
        println!(
            "{}: ${:.2} ({:.0}%)",
            breakdown.tax_kind, breakdown.tax_due, breakdown.rate_percent
        );
    }
}

// =============================================================================
// Tests (cargo test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn each_strategy_applies_its_rate() {
        let cases: [(Box<dyn TaxStrategy>, f64); 4] = [
            (Box::new(Icms), 40.0),
            (Box::new(Iss), 110.0),
            (Box::new(Ipi), 150.0),
            (Box::new(Iva), 280.0),
        ];
        for (strategy, expected) in cases {
            assert!((strategy.calculate(1000.0) - expected).abs() < EPS);
        }
    }

    #[test]
    fn calculator_requires_a_strategy() {
        let calculator = TaxCalculator::default();
        assert_eq!(calculator.calculate(100.0), Err(TaxError::StrategyNotSet));
        assert_eq!(calculator.rate_percent(), Err(TaxError::StrategyNotSet));
    }

    #[test]
    fn calculator_delegates_once_configured() {
        let mut calculator = TaxCalculator::default();
        calculator.with_strategy(Box::new(Iss));
        assert!((calculator.calculate(200.0).unwrap() - 22.0).abs() < EPS);
        assert!((calculator.rate_percent().unwrap() - 11.0).abs() < EPS);
    }

    #[test]
    fn factory_rejects_unknown_kind() {
        let err = TaxStrategyFactory::create("PAYROLL").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("PAYROLL"));
        assert!(message.contains("ICMS"));
    }

    #[test]
    fn factory_covers_every_supported_tag() {
        for kind in TaxStrategyFactory::supported() {
            let strategy = TaxStrategyFactory::create(kind).unwrap();
            assert_eq!(strategy.name(), kind);
            assert!(strategy.rate() > 0.0);
        }
    }

    #[test]
    fn controller_builds_a_full_breakdown() {
        let mut controller = TaxController::new();
        let breakdown = controller.assess("IPI", 500.0).unwrap();
        assert_eq!(breakdown.tax_kind, "IPI");
        assert!((breakdown.tax_due - 75.0).abs() < EPS);
        assert!((breakdown.total - 575.0).abs() < EPS);
    }

    #[test]
    fn controller_surfaces_factory_errors() {
        let mut controller = TaxController::new();
        assert!(matches!(
            controller.assess("nope", 10.0),
            Err(TaxError::UnknownKind { .. })
        ));
    }

    #[test]
    fn breakdown_serializes_for_structured_output() {
        let mut controller = TaxController::new();
        let breakdown = controller.assess("ICMS", 1000.0).unwrap();
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["tax_kind"], "ICMS");
        assert_eq!(json["rate_percent"], 4.0);
    }

    #[test]
    fn swapping_strategies_changes_the_answer() {
        let mut controller = TaxController::new();
        let low = controller.assess("ICMS", 1000.0).unwrap().tax_due;
        let high = controller.assess("IVA", 1000.0).unwrap().tax_due;
        assert!(high > low);
    }
}
