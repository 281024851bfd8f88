//! Replay a script of cart commands.
//!
//! A script is a list of tagged [`CartCommand`]s:
//!
//! ```yaml
//! - command: add_item
//!   id: 1
//!   name: Boston Fern
//!   unit_cost: "12.50"
//!   image: https://cdn.example.com/fern.jpg
//! - command: adjust_quantity
//!   id: 1
//!   delta: 1
//! ```
//!
//! Commands are applied in order to an empty cart, then the cart is printed
//! the same way the storefront lays it out.

use std::io::Write;
use std::path::Path;

use cartwheel_core::{CartCommand, CartState, Money, NewCartEntry, Price, ProductId};
use serde::Serialize;
use tracing::{debug, info};

use super::CliError;
use crate::OutputFormat;

/// Load the script at `path`, apply it, and print the cart to `out`.
///
/// # Errors
///
/// Returns an error if the script cannot be read or parsed, or if writing
/// the output fails.
pub fn run(path: &Path, format: OutputFormat, out: &mut impl Write) -> Result<(), CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let commands = parse_script(path, &content)?;
    info!(path = %path.display(), commands = commands.len(), "Loaded script");

    let cart = replay(commands);
    match format {
        OutputFormat::Text => render_text(&cart, out)?,
        OutputFormat::Json => render_json(&cart, out)?,
    }
    Ok(())
}

/// Print the demo script as YAML.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn print_scenario(out: &mut impl Write) -> Result<(), CliError> {
    let yaml = serde_yaml::to_string(&demo_script())?;
    out.write_all(yaml.as_bytes())?;
    Ok(())
}

/// Parse a script, choosing YAML or JSON by file extension.
fn parse_script(path: &Path, content: &str) -> Result<Vec<CartCommand>, CliError> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        Ok(serde_yaml::from_str(content)?)
    } else {
        Ok(serde_json::from_str(content)?)
    }
}

/// Apply `commands` in order to an empty cart.
fn replay(commands: Vec<CartCommand>) -> CartState {
    let mut cart = CartState::new();
    for (step, command) in commands.into_iter().enumerate() {
        let name = command.name();
        let outcome = cart.apply(command);
        debug!(step, command = name, ?outcome, "Applied command");
    }
    cart
}

fn render_text(cart: &CartState, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Your Cart ({} items)", cart.total_quantity())?;
    if cart.is_empty() {
        writeln!(out, "Your cart is empty.")?;
        return Ok(());
    }

    for entry in cart.entries() {
        writeln!(
            out,
            "  [{}] {}  {} x {} = {}",
            entry.id(),
            entry.name(),
            entry.quantity(),
            entry.unit_cost(),
            entry.subtotal()
        )?;
    }
    writeln!(out, "Total: {}", cart.grand_total())
}

#[derive(Serialize)]
struct JsonCart<'a> {
    #[serde(flatten)]
    cart: &'a CartState,
    grand_total: Money,
    grand_total_display: String,
}

fn render_json(cart: &CartState, out: &mut impl Write) -> Result<(), CliError> {
    let grand_total = cart.grand_total();
    let json = JsonCart {
        cart,
        grand_total,
        grand_total_display: grand_total.amount_string(),
    };
    serde_json::to_writer_pretty(&mut *out, &json)?;
    writeln!(out)?;
    Ok(())
}

fn demo_item(id: i32, name: &str, cents: i64) -> CartCommand {
    CartCommand::AddItem(NewCartEntry {
        id: ProductId::new(id),
        name: name.to_string(),
        unit_cost: Price::from_cents(cents).unwrap_or(Price::ZERO),
        image: format!("https://cdn.example.com/products/{id}.jpg"),
    })
}

/// A short session: browse, adjust, remove.
fn demo_script() -> Vec<CartCommand> {
    vec![
        demo_item(1, "Boston Fern", 1250),
        demo_item(2, "Snake Plant", 1500),
        demo_item(1, "Boston Fern", 1250),
        CartCommand::AdjustQuantity {
            id: ProductId::new(2),
            delta: -1,
        },
        demo_item(3, "Peace Lily", 1899),
        CartCommand::UpdateQuantity {
            id: ProductId::new(3),
            quantity: 3,
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn render(cart: &CartState) -> String {
        let mut out = Vec::new();
        render_text(cart, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_demo_script_result() {
        let cart = replay(demo_script());

        // Fern x2, Snake Plant removed, Peace Lily x3
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_quantity(), 5);
        assert_eq!(cart.grand_total().to_string(), "$81.97");
    }

    #[test]
    fn test_render_text() {
        let text = render(&replay(demo_script()));

        assert!(text.starts_with("Your Cart (5 items)\n"));
        assert!(text.contains("[1] Boston Fern  2 x $12.50 = $25.00"));
        assert!(text.contains("[3] Peace Lily  3 x $18.99 = $56.97"));
        assert!(text.ends_with("Total: $81.97\n"));
    }

    #[test]
    fn test_render_text_empty() {
        assert_eq!(
            render(&CartState::new()),
            "Your Cart (0 items)\nYour cart is empty.\n"
        );
    }

    #[test]
    fn test_render_json_includes_rounded_total() {
        let cart = replay(vec![
            demo_item(1, "Pothos", 0),
            CartCommand::Clear,
            CartCommand::AddItem(NewCartEntry {
                id: ProductId::new(9),
                name: "Moss".to_string(),
                unit_cost: Price::parse("2.555").unwrap(),
                image: String::new(),
            }),
            CartCommand::AdjustQuantity {
                id: ProductId::new(9),
                delta: 1,
            },
        ]);

        let mut out = Vec::new();
        render_json(&cart, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["total_quantity"], 2);
        assert_eq!(value["grand_total"], "5.110");
        assert_eq!(value["grand_total_display"], "5.11");
    }

    #[test]
    fn test_scenario_round_trips_through_yaml() {
        let mut out = Vec::new();
        print_scenario(&mut out).unwrap();
        let yaml = String::from_utf8(out).unwrap();

        let parsed = parse_script(Path::new("demo.yaml"), &yaml).unwrap();
        assert_eq!(parsed, demo_script());
    }

    #[test]
    fn test_parse_script_json_by_default() {
        let json = r#"[{"command":"remove_item","id":4}]"#;
        let parsed = parse_script(Path::new("script.txt"), json).unwrap();
        assert_eq!(parsed, vec![CartCommand::RemoveItem { id: ProductId::new(4) }]);
    }

    #[test]
    fn test_parse_script_rejects_negative_price() {
        let yaml = "- command: add_item\n  id: 1\n  name: Fern\n  unit_cost: \"-3\"\n  image: x\n";
        assert!(matches!(
            parse_script(Path::new("bad.yml"), yaml),
            Err(CliError::Yaml(_))
        ));
    }

    #[test]
    fn test_run_reports_missing_file() {
        let mut out = Vec::new();
        let err = run(Path::new("/nonexistent/cart.yaml"), OutputFormat::Text, &mut out)
            .unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }
}
