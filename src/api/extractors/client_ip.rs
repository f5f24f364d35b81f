use axum::{
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use crate::state::AppState;

/// Client address used to key rate limits.
///
/// `X-Forwarded-For` is only honored when the socket peer is a configured
/// trusted proxy. Otherwise the peer address is used, then `"unknown"`.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        Ok(ClientIp(client_ip(
            &parts.headers,
            parts.extensions.get::<ConnectInfo<SocketAddr>>(),
            &app_state.config.trusted_proxies,
        )))
    }
}

pub fn client_ip(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    trusted_proxies: &[IpAddr],
) -> String {
    let peer = connect_info.map(|ConnectInfo(addr)| addr.ip());

    if let Some(peer) = peer
        && trusted_proxies.contains(&peer)
        && let Some(forwarded) = forwarded_client(headers)
    {
        return forwarded;
    }

    peer.map(|ip| ip.to_string()).unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("X-Forwarded-For")?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    (!first.is_empty()).then(|| first.to_string())
}
