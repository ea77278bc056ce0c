use colored::Colorize;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

// =============================================================================
// Template Method pattern: a report pipeline with a fixed skeleton
//
// `generate` is the template: validate -> process -> format -> render ->
// save -> notify. Each report supplies its own validation, processing and
// formatting; rendering, saving and notification are shared defaults that
// a report may override.
// =============================================================================

#[derive(Error, Debug)]
enum ReportError {
    #[error("csv rendering failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("json rendering failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// A formatted row: ordered display fields, ready for any renderer.
type DisplayRow = Vec<(String, String)>;

trait ReportGenerator {
    fn report_kind(&self) -> &'static str;
    fn file_extension(&self) -> &'static str;

    /// Drops rows that do not belong in this report, narrating each drop.
    fn validate(&self, rows: Vec<Value>) -> Vec<Value>;
    fn process(&self, rows: Vec<Value>) -> Vec<Value>;
    fn format(&self, rows: Vec<Value>) -> Vec<DisplayRow>;

    /// The template method. Not meant to be overridden.
    fn generate(&self, rows: Vec<Value>) -> Result<String, ReportError> {
        println!("starting {} report", self.report_kind());

        let valid = self.validate(rows);
        println!("validated: {} rows", valid.len());

        let processed = self.process(valid);
        println!("processed: {} rows", processed.len());

        let formatted = self.format(processed);
        println!("formatted: {} rows", formatted.len());

        let content = self.render(&formatted)?;
        let path = self.save(&content);
        self.notify(&path, formatted.len());

        println!("{} {} report done", "ok".green(), self.report_kind());
        Ok(path)
    }

    fn render(&self, rows: &[DisplayRow]) -> Result<String, ReportError> {
        let mut out = String::new();
        out.push_str(&format!("==== {} REPORT ====\n", self.report_kind().to_uppercase()));
        if rows.is_empty() {
            out.push_str("no rows matched\n");
        } else {
            out.push_str(&format!("rows: {}\n\n", rows.len()));
            for (i, row) in rows.iter().take(5).enumerate() {
                out.push_str(&format!("row {}:\n", i + 1));
                for (key, value) in row {
                    out.push_str(&format!("  {key}: {value}\n"));
                }
            }
            if rows.len() > 5 {
                out.push_str(&format!("... and {} more\n", rows.len() - 5));
            }
        }
        out.push_str("==== end of report ====\n");
        Ok(out)
    }

    /// Computes where the report would land. Nothing touches disk; the
    /// demos only narrate the write.
    fn save(&self, content: &str) -> String {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = format!(
            "reports/report_{}_{stamp}.{}",
            self.report_kind().to_lowercase(),
            self.file_extension()
        );
        println!("  saved {path} ({} bytes)", content.len());
        path
    }

    fn notify(&self, path: &str, rows: usize) {
        println!("  email -> reports@example.com: {} report, {rows} rows", self.report_kind());
        println!("  internal feed -> {path}");
    }
}

// =============================================================================
// Field helpers shared by the concrete reports
// =============================================================================

fn str_field<'a>(row: &'a Value, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str)
}

fn num_field(row: &Value, key: &str) -> Option<f64> {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Sales report: commission per row, plain-text rendering
// =============================================================================

const COMMISSION_RATE: f64 = 0.05;

struct SalesReport;

impl ReportGenerator for SalesReport {
    fn report_kind(&self) -> &'static str {
        "sales"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn validate(&self, rows: Vec<Value>) -> Vec<Value> {
        rows.into_iter()
            .filter(|row| {
                let ok = str_field(row, "seller").is_some()
                    && str_field(row, "date").is_some()
                    && num_field(row, "amount").is_some();
                if !ok {
                    println!("  {} dropping malformed sales row: {row}", "warn:".yellow());
                }
                ok
            })
            .collect()
    }

    fn process(&self, rows: Vec<Value>) -> Vec<Value> {
        rows.into_iter()
            .map(|row| {
                let amount = num_field(&row, "amount").unwrap_or(0.0);
                json!({
                    "seller": str_field(&row, "seller").unwrap_or("").to_uppercase(),
                    "amount": amount,
                    "date": str_field(&row, "date").unwrap_or(""),
                    "commission": amount * COMMISSION_RATE,
                })
            })
            .collect()
    }

    fn format(&self, rows: Vec<Value>) -> Vec<DisplayRow> {
        rows.iter()
            .map(|row| {
                vec![
                    ("Seller".to_string(), str_field(row, "seller").unwrap_or("").to_string()),
                    ("Amount".to_string(), format!("${:.2}", num_field(row, "amount").unwrap_or(0.0))),
                    ("Date".to_string(), str_field(row, "date").unwrap_or("").to_string()),
                    ("Commission".to_string(), format!("${:.2}", num_field(row, "commission").unwrap_or(0.0))),
                ]
            })
            .collect()
    }
}

// =============================================================================
// Inventory report: stock banding, CSV rendering
// =============================================================================

const STOCK_HIGH: f64 = 100.0;
const STOCK_LOW: f64 = 20.0;

struct InventoryReport;

fn stock_status(quantity: f64) -> &'static str {
    if quantity > STOCK_HIGH {
        "high"
    } else if quantity < STOCK_LOW {
        "low"
    } else {
        "normal"
    }
}

impl ReportGenerator for InventoryReport {
    fn report_kind(&self) -> &'static str {
        "inventory"
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }

    fn validate(&self, rows: Vec<Value>) -> Vec<Value> {
        rows.into_iter()
            .filter(|row| {
                let ok = str_field(row, "product").is_some()
                    && num_field(row, "quantity").is_some()
                    && num_field(row, "price").is_some();
                if !ok {
                    println!("  {} dropping malformed inventory row: {row}", "warn:".yellow());
                }
                ok
            })
            .collect()
    }

    fn process(&self, rows: Vec<Value>) -> Vec<Value> {
        rows.into_iter()
            .map(|row| {
                let quantity = num_field(&row, "quantity").unwrap_or(0.0);
                let price = num_field(&row, "price").unwrap_or(0.0);
                json!({
                    "product": str_field(&row, "product").unwrap_or("").to_uppercase(),
                    "quantity": quantity,
                    "price": price,
                    "total_value": quantity * price,
                    "stock_status": stock_status(quantity),
                })
            })
            .collect()
    }

    fn format(&self, rows: Vec<Value>) -> Vec<DisplayRow> {
        rows.iter()
            .map(|row| {
                vec![
                    ("product".to_string(), str_field(row, "product").unwrap_or("").to_string()),
                    ("quantity".to_string(), format!("{:.0}", num_field(row, "quantity").unwrap_or(0.0))),
                    ("unit_price".to_string(), format!("{:.2}", num_field(row, "price").unwrap_or(0.0))),
                    ("total_value".to_string(), format!("{:.2}", num_field(row, "total_value").unwrap_or(0.0))),
                    ("stock_status".to_string(), str_field(row, "stock_status").unwrap_or("").to_string()),
                ]
            })
            .collect()
    }

    // CSV is a real format here, so render with a real writer.
    fn render(&self, rows: &[DisplayRow]) -> Result<String, ReportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if let Some(first) = rows.first() {
            writer.write_record(first.iter().map(|(key, _)| key.as_str()))?;
        }
        for row in rows {
            writer.write_record(row.iter().map(|(_, value)| value.as_str()))?;
        }
        let bytes = writer.into_inner().expect("in-memory csv writer");
        Ok(String::from_utf8(bytes).expect("csv output is utf-8"))
    }
}

// =============================================================================
// Financial report: sign-based classification, JSON rendering, custom save
// =============================================================================

struct FinancialReport;

impl ReportGenerator for FinancialReport {
    fn report_kind(&self) -> &'static str {
        "financial"
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn validate(&self, rows: Vec<Value>) -> Vec<Value> {
        rows.into_iter()
            .filter(|row| {
                let ok = str_field(row, "account").is_some()
                    && str_field(row, "kind").is_some()
                    && num_field(row, "amount").is_some();
                if !ok {
                    println!("  {} dropping malformed financial row: {row}", "warn:".yellow());
                }
                ok
            })
            .collect()
    }

    fn process(&self, rows: Vec<Value>) -> Vec<Value> {
        rows.into_iter()
            .map(|row| {
                let amount = num_field(&row, "amount").unwrap_or(0.0);
                json!({
                    "account": str_field(&row, "account").unwrap_or("").to_uppercase(),
                    "amount": amount,
                    "kind": str_field(&row, "kind").unwrap_or("").to_uppercase(),
                    "category": if amount > 0.0 { "income" } else { "expense" },
                })
            })
            .collect()
    }

    fn format(&self, rows: Vec<Value>) -> Vec<DisplayRow> {
        rows.iter()
            .map(|row| {
                vec![
                    ("account".to_string(), str_field(row, "account").unwrap_or("").to_string()),
                    ("amount".to_string(), format!("{:.2}", num_field(row, "amount").unwrap_or(0.0))),
                    ("kind".to_string(), str_field(row, "kind").unwrap_or("").to_string()),
                    ("category".to_string(), str_field(row, "category").unwrap_or("").to_string()),
                ]
            })
            .collect()
    }

    fn render(&self, rows: &[DisplayRow]) -> Result<String, ReportError> {
        let objects: Vec<Value> = rows
            .iter()
            .map(|row| Value::Object(row.iter().cloned().map(|(k, v)| (k, Value::String(v))).collect()))
            .collect();
        Ok(serde_json::to_string_pretty(&objects)?)
    }

    fn save(&self, content: &str) -> String {
        println!("  saving as structured JSON");
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = format!("reports/report_financial_{stamp}.json");
        println!("  saved {path} ({} bytes)", content.len());
        path
    }
}

// =============================================================================
// Customer report: contact sanity checks, default rendering
// =============================================================================

struct CustomerReport;

impl ReportGenerator for CustomerReport {
    fn report_kind(&self) -> &'static str {
        "customers"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn validate(&self, rows: Vec<Value>) -> Vec<Value> {
        rows.into_iter()
            .filter(|row| {
                let email_ok = str_field(row, "email").map(|e| e.contains('@')).unwrap_or(false);
                let ok = str_field(row, "name").is_some()
                    && str_field(row, "phone").is_some()
                    && email_ok;
                if !ok {
                    println!("  {} dropping malformed customer row: {row}", "warn:".yellow());
                }
                ok
            })
            .collect()
    }

    fn process(&self, rows: Vec<Value>) -> Vec<Value> {
        rows.into_iter()
            .map(|row| {
                json!({
                    "name": title_case(str_field(&row, "name").unwrap_or("")),
                    "email": str_field(&row, "email").unwrap_or("").to_lowercase(),
                    "phone": str_field(&row, "phone").unwrap_or(""),
                    "status": "active",
                })
            })
            .collect()
    }

    fn format(&self, rows: Vec<Value>) -> Vec<DisplayRow> {
        rows.iter()
            .map(|row| {
                vec![
                    ("Name".to_string(), str_field(row, "name").unwrap_or("").to_string()),
                    ("Email".to_string(), str_field(row, "email").unwrap_or("").to_string()),
                    ("Phone".to_string(), str_field(row, "phone").unwrap_or("").to_string()),
                    ("Status".to_string(), str_field(row, "status").unwrap_or("").to_string()),
                ]
            })
            .collect()
    }
}

// =============================================================================
// Demo (cargo run)
// =============================================================================

fn main() {
    let sales = vec![
        json!({"seller": "Joana Silva", "amount": "1500.00", "date": "2024-01-15"}),
        json!({"seller": "Marcos Reis", "amount": "2300.50", "date": "2024-01-16"}),
        json!({"seller": "Pedro Costa", "amount": "not-a-number", "date": "2024-01-17"}),
    ];
    let inventory = vec![
        json!({"product": "Notebook", "quantity": "50", "price": "2500.00"}),
        json!({"product": "Mouse", "quantity": "200", "price": "25.00"}),
        json!({"product": "Keyboard", "quantity": "15", "price": "150.00"}),
    ];
    let financial = vec![
        json!({"account": "Sales", "amount": "5000.00", "kind": "revenue"}),
        json!({"account": "Payroll", "amount": "-3000.00", "kind": "expense"}),
        json!({"account": "Rent", "amount": "-800.00", "kind": "expense"}),
    ];
    let customers = vec![
        json!({"name": "ana silva", "email": "Ana@Email.com", "phone": "11999999999"}),
        json!({"name": "carlos santos", "email": "broken-email", "phone": "11888888888"}),
    ];

    let runs: Vec<(Box<dyn ReportGenerator>, Vec<Value>)> = vec![
        (Box::new(SalesReport), sales),
        (Box::new(InventoryReport), inventory),
        (Box::new(FinancialReport), financial),
        (Box::new(CustomerReport), customers),
    ];

    for (generator, rows) in runs {
        println!("\n-- {} --", generator.report_kind());
        match generator.generate(rows) {
            Ok(path) => println!("report at {path}"),
            Err(err) => println!("{} {err}", "error:".red()),
        }
    }

    // Extending the pipeline means implementing the three hooks; the
    // skeleton comes along for free.
    println!("\n-- ad hoc performance report --");
    struct PerformanceReport;
    impl ReportGenerator for PerformanceReport {
        fn report_kind(&self) -> &'static str {
            "performance"
        }

        fn file_extension(&self) -> &'static str {
            "txt"
        }

        fn validate(&self, rows: Vec<Value>) -> Vec<Value> {
            rows
        }

        fn process(&self, rows: Vec<Value>) -> Vec<Value> {
            rows
        }

        fn format(&self, rows: Vec<Value>) -> Vec<DisplayRow> {
            rows.iter()
                .map(|row| {
                    vec![
                        ("metric".to_string(), str_field(row, "metric").unwrap_or("").to_string()),
                        ("value".to_string(), str_field(row, "value").unwrap_or("").to_string()),
                    ]
                })
                .collect()
        }
    }

    let metrics = vec![
        json!({"metric": "uptime", "value": "99.9%"}),
        json!({"metric": "p99 latency", "value": "150ms"}),
    ];
    PerformanceReport.generate(metrics).unwrap();
}

// =============================================================================
// Tests (cargo test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sales_validation_drops_bad_amounts() {
        let rows = vec![
            json!({"seller": "a", "amount": "100", "date": "d"}),
            json!({"seller": "b", "amount": "oops", "date": "d"}),
            json!({"seller": "c", "date": "d"}),
        ];
        assert_eq!(SalesReport.validate(rows).len(), 1);
    }

    #[test]
    fn sales_commission_is_five_percent() {
        let rows = SalesReport.process(vec![json!({
            "seller": "ana", "amount": "1000.00", "date": "d"
        })]);
        assert_eq!(rows[0]["seller"], "ANA");
        assert!((num_field(&rows[0], "commission").unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn stock_banding_thresholds() {
        assert_eq!(stock_status(150.0), "high");
        assert_eq!(stock_status(100.0), "normal");
        assert_eq!(stock_status(20.0), "normal");
        assert_eq!(stock_status(19.0), "low");
    }

    #[test]
    fn inventory_renders_real_csv() {
        let rows = InventoryReport.process(InventoryReport.validate(vec![json!({
            "product": "Mouse", "quantity": "200", "price": "25.00"
        })]));
        let formatted = InventoryReport.format(rows);
        let csv_text = InventoryReport.render(&formatted).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "product,quantity,unit_price,total_value,stock_status"
        );
        assert_eq!(lines.next().unwrap(), "MOUSE,200,25.00,5000.00,high");
    }

    #[test]
    fn financial_classifies_by_sign() {
        let rows = FinancialReport.process(vec![
            json!({"account": "sales", "amount": "100", "kind": "revenue"}),
            json!({"account": "rent", "amount": "-80", "kind": "expense"}),
        ]);
        assert_eq!(rows[0]["category"], "income");
        assert_eq!(rows[1]["category"], "expense");
    }

    #[test]
    fn financial_renders_parseable_json() {
        let formatted = FinancialReport.format(FinancialReport.process(vec![json!({
            "account": "sales", "amount": "100", "kind": "revenue"
        })]));
        let rendered = FinancialReport.render(&formatted).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed[0]["account"], "SALES");
        assert_eq!(parsed[0]["category"], "income");
    }

    #[test]
    fn customer_email_check() {
        let rows = vec![
            json!({"name": "a", "email": "a@b.c", "phone": "1"}),
            json!({"name": "b", "email": "nope", "phone": "2"}),
        ];
        assert_eq!(CustomerReport.validate(rows).len(), 1);
    }

    #[test]
    fn customer_normalization() {
        let rows = CustomerReport.process(vec![json!({
            "name": "ana maria silva", "email": "Ana@Email.com", "phone": "1"
        })]);
        assert_eq!(rows[0]["name"], "Ana Maria Silva");
        assert_eq!(rows[0]["email"], "ana@email.com");
    }

    #[test]
    fn title_case_handles_edge_cases() {
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("JOSÉ"), "José");
        assert_eq!(title_case("de la cruz"), "De La Cruz");
    }

    #[test]
    fn template_produces_a_path_with_kind_and_extension() {
        let path = SalesReport
            .generate(vec![json!({"seller": "a", "amount": "10", "date": "d"})])
            .unwrap();
        assert!(path.starts_with("reports/report_sales_"));
        assert!(path.ends_with(".txt"));
    }

    #[test]
    fn default_render_truncates_after_five_rows() {
        let rows: Vec<DisplayRow> = (0..8)
            .map(|i| vec![("n".to_string(), i.to_string())])
            .collect();
        let text = SalesReport.render(&rows).unwrap();
        assert!(text.contains("... and 3 more"));
    }

    #[test]
    fn empty_report_still_renders() {
        let text = CustomerReport.render(&[]).unwrap();
        assert!(text.contains("no rows matched"));
    }
}
