use super::ui;
use crate::rpc::CurrencyClient;
use anyhow::{Result, bail};
use tracing::debug;

/// A one-shot request against a running server.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Convert { from: String, to: String, amount: f64 },
    Rate { from: String, to: String },
    Currencies,
}

/// Sends `query` to the server at `address` and prints the answer. A domain
/// failure reported by the server is returned as an error.
pub async fn run(address: &str, query: Query) -> Result<()> {
    debug!(?query, "Sending query to {}", address);
    let mut client = CurrencyClient::connect(address).await?;

    match query {
        Query::Convert { from, to, amount } => {
            let response = client.convert(&from, &to, amount).await?;
            if !response.success {
                bail!("Conversion failed: {}", response.error_message);
            }
            println!("{}", ui::format_conversion(amount, &response));
        }
        Query::Rate { from, to } => {
            let response = client.get_exchange_rate(&from, &to).await?;
            if !response.success {
                bail!("Rate lookup failed: {}", response.error_message);
            }
            println!("{}", ui::format_rate(&from, &to, &response));
        }
        Query::Currencies => {
            let response = client.list_currencies().await?;
            if !response.success {
                bail!("Listing currencies failed: {}", response.error_message);
            }
            println!("{}", ui::style_text("Available currencies", ui::StyleType::Title));
            println!("{}", ui::currencies_table(&response));
        }
    }
    Ok(())
}
