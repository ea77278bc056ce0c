use colored::Colorize;
use itertools::Itertools;
use thiserror::Error;

// =============================================================================
// Observer pattern: a crypto price ticker fanning out to subscribers
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
enum ObserverError {
    #[error("observer '{name}' refused update: {reason}")]
    Refused { name: String, reason: String },
}

trait PriceObserver {
    fn name(&self) -> &str;
    fn on_price(&mut self, price: f64) -> Result<(), ObserverError>;
}

// =============================================================================
// Subject: the ticker
// =============================================================================

struct PriceTicker {
    symbol: String,
    price: f64,
    observers: Vec<Box<dyn PriceObserver>>,
}

impl PriceTicker {
    fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price: 0.0,
            observers: Vec::new(),
        }
    }

    fn price(&self) -> f64 {
        self.price
    }

    fn subscribe(&mut self, observer: Box<dyn PriceObserver>) {
        println!("+ subscribed: {}", observer.name());
        self.observers.push(observer);
    }

    fn unsubscribe(&mut self, name: &str) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.name() != name);
        let removed = self.observers.len() < before;
        if removed {
            println!("- unsubscribed: {name}");
        }
        removed
    }

    /// Notifies only on an actual change. One refusing observer must not
    /// starve the rest, so errors are reported and delivery continues.
    fn set_price(&mut self, new_price: f64) {
        if (new_price - self.price).abs() < f64::EPSILON {
            return;
        }
        let old = self.price;
        self.price = new_price;
        println!("{}: ${old:.2} -> ${new_price:.2}", self.symbol);
        println!("notifying {} observers", self.observers.len());

        for observer in &mut self.observers {
            if let Err(err) = observer.on_price(new_price) {
                println!("  {} {err}", "[dropped]".red());
            }
        }
    }
}

// =============================================================================
// Concrete observers
// =============================================================================

const HISTORY_CAP: usize = 10;

struct PriceLogger {
    history: Vec<f64>,
}

impl PriceLogger {
    fn new() -> Self {
        Self { history: Vec::new() }
    }

    fn history(&self) -> &[f64] {
        &self.history
    }

    fn average(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f64>() / self.history.len() as f64
    }
}

impl PriceObserver for PriceLogger {
    fn name(&self) -> &str {
        "price-logger"
    }

    fn on_price(&mut self, price: f64) -> Result<(), ObserverError> {
        self.history.push(price);
        if self.history.len() > HISTORY_CAP {
            self.history.remove(0);
        }
        println!("  [logger] recorded ${price:.2} ({} points)", self.history.len());
        Ok(())
    }
}

/// Pings investors only when the move since the last alert is large enough.
struct InvestorAlert {
    last_alerted: Option<f64>,
    threshold: f64,
}

impl InvestorAlert {
    fn new(threshold: f64) -> Self {
        Self {
            last_alerted: None,
            threshold,
        }
    }
}

impl PriceObserver for InvestorAlert {
    fn name(&self) -> &str {
        "investor-alert"
    }

    fn on_price(&mut self, price: f64) -> Result<(), ObserverError> {
        let Some(reference) = self.last_alerted else {
            self.last_alerted = Some(price);
            return Ok(());
        };

        let variation = (price - reference).abs() / reference;
        if variation >= self.threshold {
            println!(
                "  [investor] alert at ${price:.2} ({:+.1}% since last alert)",
                variation * 100.0
            );
            println!("    push -> ${price:.2}");
            println!("    email -> ${price:.2}");
            self.last_alerted = Some(price);
        }
        Ok(())
    }
}

/// Same debounce idea as the investor alert but with a wider band: the
/// newsroom only reacts to big swings.
struct NewsDesk {
    last_published: Option<f64>,
    threshold: f64,
}

impl NewsDesk {
    fn new(threshold: f64) -> Self {
        Self {
            last_published: None,
            threshold,
        }
    }
}

impl PriceObserver for NewsDesk {
    fn name(&self) -> &str {
        "news-desk"
    }

    fn on_price(&mut self, price: f64) -> Result<(), ObserverError> {
        let Some(reference) = self.last_published else {
            self.last_published = Some(price);
            return Ok(());
        };

        let variation = (price - reference).abs() / reference;
        if variation >= self.threshold {
            println!(
                "  [news] front page updated: ${price:.2} ({:.1}% swing)",
                variation * 100.0
            );
            self.last_published = Some(price);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    Rising,
    Falling,
    Sideways,
}

const TREND_WINDOW: usize = 5;

struct TrendAnalyzer {
    points: Vec<f64>,
}

impl TrendAnalyzer {
    fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Compares the average of the first and second half of the window.
    /// The halves overlap on the middle point.
    fn classify(points: &[f64]) -> Trend {
        let mid = points.len() / 2;
        let first: f64 = points[..=mid].iter().sum::<f64>() / (mid + 1) as f64;
        let second: f64 = points[mid..].iter().sum::<f64>() / (points.len() - mid) as f64;
        let variation = (second - first) / first;

        if variation > 0.05 {
            Trend::Rising
        } else if variation < -0.05 {
            Trend::Falling
        } else {
            Trend::Sideways
        }
    }

    fn streak(points: &[f64]) -> usize {
        points
            .windows(2)
            .rev()
            .take_while(|pair| pair[1] > pair[0])
            .count()
    }
}

impl PriceObserver for TrendAnalyzer {
    fn name(&self) -> &str {
        "trend-analyzer"
    }

    fn on_price(&mut self, price: f64) -> Result<(), ObserverError> {
        self.points.push(price);
        if self.points.len() > TREND_WINDOW {
            self.points.remove(0);
        }
        if self.points.len() < TREND_WINDOW {
            return Ok(());
        }

        let trend = Self::classify(&self.points);
        println!("  [trend] window says {trend:?}, up-streak {}", Self::streak(&self.points));
        match trend {
            Trend::Rising => println!("    {}", "BUY signal".green()),
            Trend::Falling => println!("    {}", "SELL signal".red()),
            Trend::Sideways => {}
        }
        Ok(())
    }
}

/// Trips deterministically above its limit; exists to show that one bad
/// observer cannot take the fan-out down with it.
struct RiskDesk {
    circuit_breaker: f64,
}

impl PriceObserver for RiskDesk {
    fn name(&self) -> &str {
        "risk-desk"
    }

    fn on_price(&mut self, price: f64) -> Result<(), ObserverError> {
        if price > self.circuit_breaker {
            return Err(ObserverError::Refused {
                name: self.name().to_string(),
                reason: format!("circuit breaker at ${:.2} tripped", self.circuit_breaker),
            });
        }
        println!("  [risk] within limits at ${price:.2}");
        Ok(())
    }
}

// =============================================================================
// Demo (cargo run)
// =============================================================================

// Scripted feed: two slow ticks, a rally, then a crash. Deterministic so
// the demo reads the same on every run.
const FEED: [f64; 8] = [
    200_000.0, 204_500.0, 212_000.0, 236_000.0, 251_000.0, 249_000.0, 205_000.0, 188_000.0,
];

fn main() {
    println!("== Observer: crypto price feed ==");
    let mut ticker = PriceTicker::new("BTC");
    ticker.subscribe(Box::new(PriceLogger::new()));
    ticker.subscribe(Box::new(InvestorAlert::new(0.10)));
    ticker.subscribe(Box::new(NewsDesk::new(0.20)));
    ticker.subscribe(Box::new(TrendAnalyzer::new()));

    for (i, price) in FEED.iter().enumerate() {
        println!("\n-- tick {} --", i + 1);
        ticker.set_price(*price);
    }
    println!("\nclosing price: ${:.2}", ticker.price());
    println!("feed was: {}", FEED.iter().map(|p| format!("{p:.0}")).format(" "));

    println!("\n== Unsubscribing mid-stream ==");
    let mut ticker = PriceTicker::new("BTC");
    ticker.subscribe(Box::new(PriceLogger::new()));
    ticker.subscribe(Box::new(InvestorAlert::new(0.10)));
    ticker.set_price(250_000.0);
    ticker.unsubscribe("investor-alert");
    ticker.set_price(260_000.0);

    println!("\n== A refusing observer does not stop the fan-out ==");
    let mut ticker = PriceTicker::new("BTC");
    ticker.subscribe(Box::new(RiskDesk {
        circuit_breaker: 220_000.0,
    }));
    ticker.subscribe(Box::new(PriceLogger::new()));
    ticker.set_price(270_000.0);
    println!("{}", "fan-out survived".green());
}

// =============================================================================
// Tests (cargo test)
// =============================================================================
