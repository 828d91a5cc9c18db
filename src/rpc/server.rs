use crate::rpc::protocol::{Frame, Reply, Request, read_frame};
use crate::service::CurrencyService;
use anyhow::{Context, Result};
use std::future::Future;
use std::net::SocketAddr;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument, warn};

/// Accepts connections until `shutdown` resolves. Every connection is served
/// by its own task, so slow clients never hold up other requests.
pub async fn serve<F>(listener: TcpListener, service: CurrencyService, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let local_addr = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!("Server started, listening on {}", local_addr);

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let service = service.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, peer, service).await {
                                warn!(%peer, error = %e, "Connection closed with error");
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "Failed to accept connection"),
                }
            }
            _ = &mut shutdown => {
                info!("Server stopping...");
                break;
            }
        }
    }
    Ok(())
}

#[instrument(name = "Connection", skip(stream, service))]
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    service: CurrencyService,
) -> Result<()> {
    debug!("Client connected");
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    while let Some(frame) = read_frame(&mut reader)
        .await
        .context("Failed to read request")?
    {
        let reply = match frame {
            Frame::Line(line) if line.trim().is_empty() => continue,
            Frame::Line(line) => dispatch(&service, &line).await,
            Frame::Invalid(fault) => {
                warn!(%fault, "Unreadable request");
                Reply::Fault { fault }
            }
        };
        let mut payload = serde_json::to_string(&reply).context("Failed to encode reply")?;
        payload.push('\n');
        writer
            .write_all(payload.as_bytes())
            .await
            .context("Failed to write reply")?;
    }

    debug!("Client disconnected");
    Ok(())
}

/// Decodes one request line and runs the matching handler.
pub async fn dispatch(service: &CurrencyService, line: &str) -> Reply {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Malformed request");
            return Reply::Fault {
                fault: format!("Malformed request: {e}"),
            };
        }
    };

    match request {
        Request::Convert(request) => Reply::Convert(service.convert(&request).await),
        Request::GetExchangeRate(request) => {
            Reply::ExchangeRate(service.get_exchange_rate(&request).await)
        }
        Request::ListCurrencies => Reply::Currencies(service.list_currencies().await),
    }
}
