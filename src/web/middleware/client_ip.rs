//! Client address extraction.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use std::convert::Infallible;
use std::net::SocketAddr;

/// Header set by reverse proxies in front of the service.
const FORWARDED_FOR: &str = "x-forwarded-for";

/// The caller's address: the first `X-Forwarded-For` hop, else the socket
/// peer. `None` when neither is known.
#[derive(Debug, Clone)]
pub struct ClientIp(pub Option<String>);

/// First hop of an `X-Forwarded-For` header.
fn forwarded_for(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|hop| hop.trim().to_string())
        .filter(|hop| !hop.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = forwarded_for(parts).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });
        Ok(ClientIp(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_forwarded_for_first_hop() {
        let (parts, _) = Request::builder()
            .header(FORWARDED_FOR, "203.0.113.7, 10.0.0.1")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(forwarded_for(&parts).as_deref(), Some("203.0.113.7"));
    }

    #[tokio::test]
    async fn test_falls_back_to_peer_address() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let peer: SocketAddr = "192.0.2.10:5000".parse().unwrap();
        parts.extensions.insert(ConnectInfo(peer));

        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip.as_deref(), Some("192.0.2.10"));
    }

    #[tokio::test]
    async fn test_unknown_address() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(ip.is_none());
    }
}
