use colored::Colorize;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

// =============================================================================
// Adapter pattern: one PDF contract over three incompatible engines
//
// The report generator only knows `PdfBackend`. Each adapter wraps a
// vendor-style engine with its own call shape and hides it.
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
enum PdfError {
    #[error("{engine} failed: {reason}")]
    Backend { engine: &'static str, reason: String },

    #[error("unknown pdf backend '{tag}'")]
    UnknownBackend { tag: String },

    #[error("report has no line items")]
    EmptyReport,
}

#[derive(Debug, Clone, PartialEq)]
struct RenderedPdf {
    filename: String,
    engine: &'static str,
    bytes: usize,
}

trait PdfBackend {
    fn engine_name(&self) -> &'static str;
    fn render(&mut self, filename: &str, html: &str) -> Result<RenderedPdf, PdfError>;
}

// =============================================================================
// Vendor-style engines, each with its own awkward API
// =============================================================================

/// Load-then-render engine: html must be loaded and laid out before the
/// bytes can be asked for.
#[derive(Default)]
struct HtmlDomEngine {
    document: Option<String>,
    paper: &'static str,
    laid_out: bool,
}

impl HtmlDomEngine {
    fn load_html(&mut self, html: &str) {
        self.document = Some(html.to_string());
        self.laid_out = false;
    }

    fn set_paper(&mut self, paper: &'static str) {
        self.paper = paper;
    }

    fn layout(&mut self) -> Result<(), String> {
        match &self.document {
            Some(doc) if !doc.is_empty() => {
                self.laid_out = true;
                Ok(())
            }
            _ => Err("no document loaded".to_string()),
        }
    }

    fn output(&self) -> Result<Vec<u8>, String> {
        if !self.laid_out {
            return Err("layout() was never called".to_string());
        }
        let doc = self.document.as_deref().unwrap_or("");
        Ok(format!("%DOM-PDF {} {doc}", self.paper).into_bytes())
    }
}

/// Write-then-output engine: content is appended page by page.
#[derive(Default)]
struct TurboPdf {
    pages: Vec<String>,
    font: &'static str,
}

impl TurboPdf {
    fn set_font(&mut self, font: &'static str) {
        self.font = font;
    }

    fn write_html(&mut self, html: &str) {
        self.pages.push(html.to_string());
    }

    fn output_bytes(&self) -> Result<Vec<u8>, String> {
        if self.pages.is_empty() {
            return Err("nothing written".to_string());
        }
        Ok(format!("%TURBO-PDF font={} {}", self.font, self.pages.join("\x0c")).into_bytes())
    }
}

/// One-shot engine.
struct MicroPdf;

impl MicroPdf {
    fn write(&self, html: &str) -> Result<Vec<u8>, String> {
        if html.is_empty() {
            return Err("empty input".to_string());
        }
        Ok(format!("%MICRO-PDF {html}").into_bytes())
    }
}

// =============================================================================
// Adapters
// =============================================================================

#[derive(Default)]
struct DomEngineAdapter {
    engine: HtmlDomEngine,
}

impl PdfBackend for DomEngineAdapter {
    fn engine_name(&self) -> &'static str {
        "dom-engine"
    }

    fn render(&mut self, filename: &str, html: &str) -> Result<RenderedPdf, PdfError> {
        println!("rendering with {}", self.engine_name());
        self.engine.load_html(html);
        self.engine.set_paper("A4-landscape");
        let wrap = |reason: String| PdfError::Backend {
            engine: "dom-engine",
            reason,
        };
        self.engine.layout().map_err(wrap)?;
        let bytes = self.engine.output().map_err(wrap)?;
        Ok(RenderedPdf {
            filename: filename.to_string(),
            engine: self.engine_name(),
            bytes: bytes.len(),
        })
    }
}

#[derive(Default)]
struct TurboPdfAdapter {
    engine: TurboPdf,
}

impl PdfBackend for TurboPdfAdapter {
    fn engine_name(&self) -> &'static str {
        "turbo-pdf"
    }

    fn render(&mut self, filename: &str, html: &str) -> Result<RenderedPdf, PdfError> {
        println!("rendering with {}", self.engine_name());
        if html.is_empty() {
            return Err(PdfError::Backend {
                engine: "turbo-pdf",
                reason: "refusing to write an empty page".to_string(),
            });
        }
        self.engine.set_font("helvetica");
        self.engine.write_html(html);
        let bytes = self.engine.output_bytes().map_err(|reason| PdfError::Backend {
            engine: "turbo-pdf",
            reason,
        })?;
        Ok(RenderedPdf {
            filename: filename.to_string(),
            engine: self.engine_name(),
            bytes: bytes.len(),
        })
    }
}

struct MicroPdfAdapter {
    engine: MicroPdf,
}

impl Default for MicroPdfAdapter {
    fn default() -> Self {
        Self { engine: MicroPdf }
    }
}

impl PdfBackend for MicroPdfAdapter {
    fn engine_name(&self) -> &'static str {
        "micro-pdf"
    }

    fn render(&mut self, filename: &str, html: &str) -> Result<RenderedPdf, PdfError> {
        println!("rendering with {}", self.engine_name());
        let bytes = self.engine.write(html).map_err(|reason| PdfError::Backend {
            engine: "micro-pdf",
            reason,
        })?;
        Ok(RenderedPdf {
            filename: filename.to_string(),
            engine: self.engine_name(),
            bytes: bytes.len(),
        })
    }
}

fn backend_for(tag: &str) -> Result<Box<dyn PdfBackend>, PdfError> {
    match tag {
        "dom-engine" => Ok(Box::<DomEngineAdapter>::default()),
        "turbo-pdf" => Ok(Box::<TurboPdfAdapter>::default()),
        "micro-pdf" => Ok(Box::<MicroPdfAdapter>::default()),
        other => Err(PdfError::UnknownBackend {
            tag: other.to_string(),
        }),
    }
}

// =============================================================================
// Client: the sales report generator
// =============================================================================

struct LineItem {
    product: String,
    unit_price: f64,
    quantity: u32,
}

impl LineItem {
    fn total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

struct SalesReportGenerator {
    company: String,
    backend: Box<dyn PdfBackend>,
    items: Vec<LineItem>,
}

impl SalesReportGenerator {
    fn new(backend: Box<dyn PdfBackend>, company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            backend,
            items: Vec::new(),
        }
    }

    fn add_sale(&mut self, product: impl Into<String>, unit_price: f64, quantity: u32) {
        self.items.push(LineItem {
            product: product.into(),
            unit_price,
            quantity,
        });
    }

    fn total_sales(&self) -> f64 {
        self.items.iter().map(LineItem::total).sum()
    }

    fn generate(&mut self) -> Result<RenderedPdf, PdfError> {
        if self.items.is_empty() {
            return Err(PdfError::EmptyReport);
        }

        println!("building sales report for {}", self.company);
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let filename = format!("sales_report_{stamp}.pdf");
        let html = self.build_html();

        let pdf = self.backend.render(&filename, &html)?;
        println!(
            "{} {} via {} ({} bytes), total ${:.2}",
            "done:".green(),
            pdf.filename,
            pdf.engine,
            pdf.bytes,
            self.total_sales()
        );
        Ok(pdf)
    }

    fn build_html(&self) -> String {
        let total_items: u32 = self.items.iter().map(|i| i.quantity).sum();
        let mut html = String::new();
        html.push_str("<html><body>");
        html.push_str(&format!(
            "<h1>{}</h1><h2>Sales report</h2>",
            html_escape::encode_text(&self.company)
        ));
        html.push_str(&format!(
            "<div class=\"summary\">Total ${:.2} / {} items / {} products</div>",
            self.total_sales(),
            total_items,
            self.items.len()
        ));
        html.push_str("<table><tr><th>Product</th><th>Unit</th><th>Qty</th><th>Total</th></tr>");
        for item in &self.items {
            html.push_str(&format!(
                "<tr><td>{}</td><td>${:.2}</td><td>{}</td><td>${:.2}</td></tr>",
                html_escape::encode_text(&item.product),
                item.unit_price,
                item.quantity,
                item.total()
            ));
        }
        html.push_str("</table>");
        html.push_str(&format!("<div class=\"total\">Grand total ${:.2}</div>", self.total_sales()));
        html.push_str("</body></html>");
        html
    }
}

// =============================================================================
// Demo (cargo run)
// =============================================================================

fn demo_items(generator: &mut SalesReportGenerator) {
    generator.add_sale("Notebook 14\"", 2500.00, 2);
    generator.add_sale("Wireless mouse", 89.90, 5);
    generator.add_sale("Mechanical keyboard", 299.90, 3);
    generator.add_sale("HDMI cable <1.5m>", 29.90, 10);
}

fn main() {
    for tag in ["dom-engine", "turbo-pdf", "micro-pdf"] {
        println!("== {tag} ==");
        let backend = backend_for(tag).unwrap();
        let mut generator = SalesReportGenerator::new(backend, "TechStore Ltda");
        demo_items(&mut generator);
        generator.generate().unwrap();
        println!();
    }

    println!("== Backend picked from configuration ==");
    match backend_for("laser-printer") {
        Ok(_) => unreachable!(),
        Err(err) => println!("{} {err}", "error:".red()),
    }
    let backend = backend_for("micro-pdf").unwrap();
    let mut generator = SalesReportGenerator::new(backend, "Configurable Co");
    generator.add_sale("Product A", 100.00, 2);
    generator.generate().unwrap();

    println!("\n== Empty reports are refused before any engine runs ==");
    let mut empty = SalesReportGenerator::new(backend_for("turbo-pdf").unwrap(), "Nobody Inc");
    match empty.generate() {
        Err(err) => println!("{} {err}", "error:".red()),
        Ok(_) => unreachable!(),
    }
}

// =============================================================================
// Tests (cargo test)
// =============================================================================
