//! # Operator Console
//!
//! Drives the register commands line by line. Every response is printed as
//! JSON; failures print `{"error": {"code": .., "message": ..}}` and the
//! console keeps going.
//!
//! ```text
//! > section 1
//! > scan 6281
//! > mobile 5550001
//! > deduct 30
//! > pay cash
//! ```
//!
//! Line numbers typed at the console start at 1.

use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use mueen_core::{Customer, InstanceId, Money, PaymentMode, Product, SectionId, ValidationError};

use crate::commands::{cart, catalog, customer, sale, section, tabs, Lookup};
use crate::emitter::InvoiceEmitter;
use crate::error::ApiError;
use crate::ledger::ReconciliationLog;
use crate::state::{BackendState, ConfigState, SessionState};

pub const HELP: &str = "\
tabs                      list open tabs
show                      show the active tab
new                       open a new tab
close [id]                close a tab (default: active)
switch <id>               make a tab active
sections                  list sections
section <id>              select a section (re-prices the active tab)
search <text>             search the catalog
pick <n>                  add the n-th search result
scan <barcode>            add a product by barcode
qty <line> <n>            set a line quantity
price <line> <amount>     set a line price
remove <line>             remove a line
discount <amount>         set the discount
name <text>               type the customer name (shows suggestions)
choose <n>                attach the n-th suggestion
mobile <text>             type the customer mobile (exact lookup)
walkin                    keep the typed name as a walk-in customer
clear                     clear the customer
wallet on|off             toggle the wallet
deduct <amount>           set the wallet deduction
pay [cash|credit|bank|wallet] [tab id]
abandon [id]              abandon a failed wallet debit
unreconciled              list abandoned debits
help                      this text
quit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Help,
    Tabs,
    Show,
    New,
    Close(Option<InstanceId>),
    Switch(InstanceId),
    Sections,
    Section(SectionId),
    Search(String),
    Pick(usize),
    Scan(String),
    Quantity { line: usize, quantity: i64 },
    Price { line: usize, price: Money },
    Remove(usize),
    Discount(Money),
    Name(String),
    Choose(usize),
    Mobile(String),
    WalkIn,
    ClearCustomer,
    Wallet(bool),
    Deduct(Money),
    Pay {
        mode: Option<PaymentMode>,
        tab: Option<InstanceId>,
    },
    Abandon(Option<InstanceId>),
    Unreconciled,
    Quit,
}

fn invalid(field: &str, reason: impl Into<String>) -> ApiError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.into(),
    }
    .into()
}

fn required(field: &str) -> ApiError {
    ValidationError::Required {
        field: field.to_string(),
    }
    .into()
}

fn parse_tab(raw: &str) -> Result<InstanceId, ApiError> {
    raw.trim_start_matches('#')
        .parse::<u64>()
        .map(InstanceId::from_raw)
        .map_err(|_| invalid("tab", format!("'{}' is not a tab id", raw)))
}

/// 1-based line number to index.
fn parse_line(raw: Option<&str>) -> Result<usize, ApiError> {
    let raw = raw.ok_or_else(|| required("line"))?;
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(invalid("line", format!("'{}' is not a line number", raw))),
    }
}

fn parse_money(raw: Option<&str>, field: &str) -> Result<Money, ApiError> {
    let raw = raw.ok_or_else(|| required(field))?;
    Ok(Money::parse_decimal(raw)?)
}

impl ConsoleCommand {
    /// Parses one line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ApiError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        let command = match verb.to_lowercase().as_str() {
            "help" | "?" => ConsoleCommand::Help,
            "tabs" => ConsoleCommand::Tabs,
            "show" => ConsoleCommand::Show,
            "new" => ConsoleCommand::New,
            "close" => ConsoleCommand::Close(args.next().map(parse_tab).transpose()?),
            "switch" => ConsoleCommand::Switch(parse_tab(args.next().ok_or_else(|| required("tab"))?)?),
            "sections" => ConsoleCommand::Sections,
            "section" => {
                let raw = args.next().ok_or_else(|| required("section"))?;
                ConsoleCommand::Section(
                    raw.parse()
                        .map_err(|_| invalid("section", format!("'{}' is not a section id", raw)))?,
                )
            }
            "search" => ConsoleCommand::Search(rest.to_string()),
            "pick" => ConsoleCommand::Pick(parse_line(args.next())?),
            "scan" => ConsoleCommand::Scan(rest.to_string()),
            "qty" => {
                let line = parse_line(args.next())?;
                let raw = args.next().ok_or_else(|| required("quantity"))?;
                let quantity = raw
                    .parse()
                    .map_err(|_| invalid("quantity", format!("'{}' is not a number", raw)))?;
                ConsoleCommand::Quantity { line, quantity }
            }
            "price" => {
                let line = parse_line(args.next())?;
                ConsoleCommand::Price {
                    line,
                    price: parse_money(args.next(), "price")?,
                }
            }
            "remove" => ConsoleCommand::Remove(parse_line(args.next())?),
            "discount" => ConsoleCommand::Discount(parse_money(args.next(), "discount")?),
            "name" => ConsoleCommand::Name(rest.to_string()),
            "choose" => ConsoleCommand::Choose(parse_line(args.next())?),
            "mobile" => ConsoleCommand::Mobile(rest.to_string()),
            "walkin" => ConsoleCommand::WalkIn,
            "clear" => ConsoleCommand::ClearCustomer,
            "wallet" => match args.next() {
                Some("on") => ConsoleCommand::Wallet(true),
                Some("off") => ConsoleCommand::Wallet(false),
                _ => return Err(invalid("wallet", "expected on or off")),
            },
            "deduct" => ConsoleCommand::Deduct(parse_money(args.next(), "wallet deduction")?),
            "pay" => {
                let mode = args.next().map(str::parse::<PaymentMode>).transpose()?;
                let tab = args.next().map(parse_tab).transpose()?;
                ConsoleCommand::Pay { mode, tab }
            }
            "abandon" => ConsoleCommand::Abandon(args.next().map(parse_tab).transpose()?),
            "unreconciled" => ConsoleCommand::Unreconciled,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(invalid("command", format!("unknown command '{}'; try help", other))),
        };
        Ok(Some(command))
    }
}

/// Console wired to the register state.
pub struct Console {
    session: SessionState,
    backend: BackendState,
    config: ConfigState,
    emitter: Box<dyn InvoiceEmitter>,
    ledger: ReconciliationLog,
    products: Vec<Product>,
    suggestions: Vec<Customer>,
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(format!("Cannot encode response: {}", e)))
}

impl Console {
    pub fn new(
        session: SessionState,
        backend: BackendState,
        config: ConfigState,
        emitter: Box<dyn InvoiceEmitter>,
        ledger: ReconciliationLog,
    ) -> Self {
        Console {
            session,
            backend,
            config,
            emitter,
            ledger,
            products: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Reads commands until `quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let response = match ConsoleCommand::parse(&line) {
                Ok(None) => continue,
                Ok(Some(ConsoleCommand::Quit)) => break,
                Ok(Some(ConsoleCommand::Help)) => {
                    output.write_all(HELP.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                    continue;
                }
                Ok(Some(command)) => self.execute(command).await,
                Err(e) => Err(e),
            };
            let value = response.unwrap_or_else(|e| json!({ "error": e }));
            let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            output.write_all(text.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
        Ok(())
    }

    /// Runs one command and returns its JSON response.
    pub async fn execute(&mut self, command: ConsoleCommand) -> Result<Value, ApiError> {
        debug!(?command, "console command");
        let session = &self.session;
        let backend = &self.backend;
        let config = &self.config;

        match command {
            ConsoleCommand::Help | ConsoleCommand::Quit => Ok(Value::Null),
            ConsoleCommand::Tabs => to_json(tabs::list_tabs(session)?),
            ConsoleCommand::Show => to_json(tabs::get_active_tab(session, config)?),
            ConsoleCommand::New => to_json(tabs::new_tab(session, config)?),
            ConsoleCommand::Close(id) => {
                let id = match id {
                    Some(id) => id,
                    None => session.with_session(|s| s.active_id())?,
                };
                to_json(tabs::close_tab(session, config, id)?)
            }
            ConsoleCommand::Switch(id) => to_json(tabs::switch_tab(session, config, id)?),
            ConsoleCommand::Sections => to_json(section::list_sections(backend, config).await?),
            ConsoleCommand::Section(id) => to_json(section::select_section(session, backend, config, id).await?),
            ConsoleCommand::Search(query) => {
                let lookup = catalog::search_products(session, backend, config, &query).await?;
                if let Lookup::Ready(page) = &lookup {
                    self.products = page.results.clone();
                }
                to_json(lookup)
            }
            ConsoleCommand::Pick(index) => {
                let product = self
                    .products
                    .get(index)
                    .cloned()
                    .ok_or_else(|| ApiError::not_found("Search result", &(index + 1).to_string()))?;
                to_json(cart::add_product(session, config, product)?)
            }
            ConsoleCommand::Scan(barcode) => to_json(catalog::scan_barcode(session, backend, config, &barcode).await?),
            ConsoleCommand::Quantity { line, quantity } => {
                to_json(cart::set_line_quantity(session, config, line, quantity)?)
            }
            ConsoleCommand::Price { line, price } => to_json(cart::set_line_price(session, config, line, price)?),
            ConsoleCommand::Remove(line) => to_json(cart::remove_line(session, config, line)?),
            ConsoleCommand::Discount(amount) => to_json(cart::set_discount(session, config, amount)?),
            ConsoleCommand::Name(text) => {
                let lookup = customer::customer_name_input(session, backend, config, &text).await?;
                if let Lookup::Ready(found) = &lookup {
                    self.suggestions = found.clone();
                }
                to_json(lookup)
            }
            ConsoleCommand::Choose(index) => {
                let picked = self
                    .suggestions
                    .get(index)
                    .cloned()
                    .ok_or_else(|| ApiError::not_found("Suggestion", &(index + 1).to_string()))?;
                to_json(customer::select_customer(session, config, picked)?)
            }
            ConsoleCommand::Mobile(text) => to_json(customer::customer_mobile_input(session, backend, config, &text).await?),
            ConsoleCommand::WalkIn => to_json(customer::select_walk_in(session, config)?),
            ConsoleCommand::ClearCustomer => to_json(customer::clear_customer(session, config)?),
            ConsoleCommand::Wallet(on) => to_json(cart::set_use_wallet(session, config, on)?),
            ConsoleCommand::Deduct(amount) => to_json(cart::set_wallet_deduction(session, config, amount)?),
            ConsoleCommand::Pay { mode, tab } => {
                to_json(sale::checkout(session, backend, self.emitter.as_ref(), config, tab, mode).await?)
            }
            ConsoleCommand::Abandon(id) => {
                let id = match id {
                    Some(id) => id,
                    None => session.with_session(|s| s.active_id())?,
                };
                to_json(sale::abandon_debit(session, self.emitter.as_ref(), &self.ledger, config, id)?)
            }
            ConsoleCommand::Unreconciled => to_json(sale::list_unreconciled(session)?),
        }
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("config", &self.config)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{customer, price, product, section, FakeBackend, Harness, RecordingEmitter};
    use tokio::io::BufReader;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleCommand::parse("   ").unwrap(), None);
        assert_eq!(
            ConsoleCommand::parse("qty 2 5").unwrap(),
            Some(ConsoleCommand::Quantity { line: 1, quantity: 5 })
        );
        assert_eq!(
            ConsoleCommand::parse("price 1 12.50").unwrap(),
            Some(ConsoleCommand::Price {
                line: 0,
                price: Money::from_cents(1250)
            })
        );
        assert_eq!(
            ConsoleCommand::parse("pay card #3").unwrap(),
            Some(ConsoleCommand::Pay {
                mode: Some(PaymentMode::Bank),
                tab: Some(InstanceId::from_raw(3))
            })
        );
        assert_eq!(
            ConsoleCommand::parse("name Aisha Al Thani").unwrap(),
            Some(ConsoleCommand::Name("Aisha Al Thani".into()))
        );
        assert_eq!(ConsoleCommand::parse("close").unwrap(), Some(ConsoleCommand::Close(None)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(ConsoleCommand::parse("qty 0 1").unwrap_err().code, ErrorCode::ValidationError);
        assert_eq!(ConsoleCommand::parse("wallet maybe").unwrap_err().code, ErrorCode::ValidationError);
        assert_eq!(ConsoleCommand::parse("pay cheque").unwrap_err().code, ErrorCode::ValidationError);
        assert_eq!(ConsoleCommand::parse("dance").unwrap_err().code, ErrorCode::ValidationError);
    }

    #[tokio::test(start_paused = true)]
    async fn test_console_session() {
        let h = Harness::new(
            FakeBackend::new()
                .with_section(section(1), vec![price(1, 7, 1000)])
                .with_product(product(7, "6281", "Dates 1kg"))
                .with_customer(customer(5, "Aisha", "5550001", 5000)),
        );
        let emitter = RecordingEmitter::default();
        let mut console = Console::new(
            h.session.clone(),
            h.backend.clone(),
            h.config.clone(),
            Box::new(emitter),
            ReconciliationLog::disabled(),
        );

        let script = "section 1\nscan 6281\nscan 6281\nbogus\nmobile 5550001\ndeduct 15\npay cash\nquit\nshow\n";
        let mut out = Vec::new();
        console.run(BufReader::new(script.as_bytes()), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("VALIDATION_ERROR"));
        assert!(text.contains("INV-00001"));

        let sales = h.fake.sales.lock().unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].wallet_deduction, Money::from_cents(1500));
        assert_eq!(sales[0].payment_mode, PaymentMode::Cash);
        assert_eq!(h.fake.debit_count(), 1);
    }
}
