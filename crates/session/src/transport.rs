// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket dial with header injection.
//!
//! The transport holds exactly one socket; any read or write error is
//! terminal and recovery happens one level up, in the supervisor.

use crate::error::SessionError;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderName, HeaderValue};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Dial `url` with the given upgrade headers and return the duplex stream.
pub(crate) async fn connect(
    url: &str,
    headers: &[(String, String)],
) -> Result<WsStream, SessionError> {
    let mut request = url.into_client_request()?;
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| SessionError::Header(name.clone()))?;
        let value =
            HeaderValue::from_str(value).map_err(|_| SessionError::Header(name.to_string()))?;
        request.headers_mut().insert(name, value);
    }
    let (stream, _response) = connect_async(request).await?;
    Ok(stream)
}
