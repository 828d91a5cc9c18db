//! Line-delimited JSON framing: one request object per line, one reply per line.

use crate::service::messages::{
    ConvertRequest, ConvertResponse, CurrenciesResponse, ExchangeRateRequest,
    ExchangeRateResponse,
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Longest accepted line in bytes, newline included.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// A request, tagged by `method`:
/// `{"method": "Convert", "from_currency": "USD", "to_currency": "EUR", "amount": 100}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Request {
    Convert(ConvertRequest),
    GetExchangeRate(ExchangeRateRequest),
    ListCurrencies,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Convert(ConvertResponse),
    ExchangeRate(ExchangeRateResponse),
    Currencies(CurrenciesResponse),
    /// The line could not be understood; the domain handlers were not reached.
    Fault { fault: String },
}

/// One line read off the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Line(String),
    /// The line was dropped; the message says why.
    Invalid(String),
}

/// Reads the next line, or `None` at end of stream.
///
/// Lines longer than [`MAX_LINE_LEN`] are skipped up to their newline and
/// lines that are not UTF-8 are reported as [`Frame::Invalid`], so the
/// stream stays usable after either.
pub async fn read_frame<R>(reader: &mut R) -> std::io::Result<Option<Frame>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let read = (&mut *reader)
        .take(MAX_LINE_LEN as u64)
        .read_until(b'\n', &mut buf)
        .await?;
    if read == 0 {
        return Ok(None);
    }

    if read == MAX_LINE_LEN && buf.last() != Some(&b'\n') {
        skip_line(reader).await?;
        return Ok(Some(Frame::Invalid(format!(
            "Line exceeds {MAX_LINE_LEN} bytes"
        ))));
    }

    Ok(Some(match String::from_utf8(buf) {
        Ok(line) => Frame::Line(line),
        Err(e) => Frame::Invalid(format!("Line is not valid UTF-8: {e}")),
    }))
}

async fn skip_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (done, used) = {
            let available = reader.fill_buf().await?;
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (true, pos + 1),
                None => (available.is_empty(), available.len()),
            }
        };
        AsyncBufReadExt::consume(&mut *reader, used);
        if done {
            return Ok(());
        }
    }
}
