use crate::rpc::protocol::{Frame, Reply, Request, read_frame};
use crate::service::messages::{
    ConvertRequest, ConvertResponse, CurrenciesResponse, ExchangeRateRequest,
    ExchangeRateResponse,
};
use anyhow::{Context, Result, anyhow, bail};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::debug;

/// Client for the line-delimited JSON currency service.
pub struct CurrencyClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl CurrencyClient {
    pub async fn connect(address: &str) -> Result<Self> {
        let stream = TcpStream::connect(address)
            .await
            .with_context(|| format!("Failed to connect to {address}"))?;
        debug!("Client connected to {}", address);

        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    pub async fn convert(&mut self, from: &str, to: &str, amount: f64) -> Result<ConvertResponse> {
        let request = Request::Convert(ConvertRequest {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            amount,
        });
        match self.call(&request).await? {
            Reply::Convert(response) => Ok(response),
            other => Err(unexpected(other)),
        }
    }

    pub async fn get_exchange_rate(&mut self, from: &str, to: &str) -> Result<ExchangeRateResponse> {
        let request = Request::GetExchangeRate(ExchangeRateRequest {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
        });
        match self.call(&request).await? {
            Reply::ExchangeRate(response) => Ok(response),
            other => Err(unexpected(other)),
        }
    }

    pub async fn list_currencies(&mut self) -> Result<CurrenciesResponse> {
        match self.call(&Request::ListCurrencies).await? {
            Reply::Currencies(response) => Ok(response),
            other => Err(unexpected(other)),
        }
    }

    /// Sends a raw line and returns the raw reply line.
    pub async fn send_line(&mut self, line: &str) -> Result<String> {
        let mut payload = line.trim_end().to_string();
        payload.push('\n');
        self.send_bytes(payload.as_bytes()).await
    }

    /// Sends raw bytes, which should end in a newline, and returns the reply line.
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> Result<String> {
        self.writer
            .write_all(bytes)
            .await
            .context("Failed to send request")?;

        match read_frame(&mut self.reader)
            .await
            .context("Failed to read reply")?
        {
            Some(Frame::Line(line)) => Ok(line.trim_end().to_string()),
            Some(Frame::Invalid(reason)) => bail!("Unreadable reply: {reason}"),
            None => Err(anyhow!("Server closed the connection")),
        }
    }

    async fn call(&mut self, request: &Request) -> Result<Reply> {
        let line = serde_json::to_string(request).context("Failed to encode request")?;
        let reply = self.send_line(&line).await?;
        let reply: Reply = serde_json::from_str(&reply)
            .with_context(|| format!("Failed to parse reply: {reply}"))?;
        if let Reply::Fault { fault } = &reply {
            bail!("Server rejected request: {fault}");
        }
        Ok(reply)
    }
}

fn unexpected(reply: Reply) -> anyhow::Error {
    anyhow!("Unexpected reply from server: {reply:?}")
}
