use crate::service::messages::{ConvertResponse, CurrenciesResponse, ExchangeRateResponse};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Value,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Value => style(text).green().bold(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn format_conversion(amount: f64, response: &ConvertResponse) -> String {
    format!(
        "{amount} {} = {} {} {}",
        response.from_currency,
        style_text(&format!("{:.2}", response.converted_amount), StyleType::Value),
        response.to_currency,
        style_text(&format!("(rate: {})", response.exchange_rate), StyleType::Subtle),
    )
}

pub fn format_rate(from: &str, to: &str, response: &ExchangeRateResponse) -> String {
    format!(
        "1 {} = {} {}",
        from.to_ascii_uppercase(),
        style_text(&response.exchange_rate.to_string(), StyleType::Value),
        to.to_ascii_uppercase(),
    )
}

pub fn currencies_table(response: &CurrenciesResponse) -> Table {
    let mut table = new_styled_table();
    table.set_header(vec![header_cell("#"), header_cell("Currency")]);
    for (index, code) in response.currencies.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1).set_alignment(CellAlignment::Right),
            Cell::new(code),
        ]);
    }
    table
}
