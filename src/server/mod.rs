//! Local redirect endpoint for the OAuth authorization code flow.
//!
//! A deliberately small HTTP/1.1 server: it takes the browser redirect to
//! `/auth`, exchanges the code for a token, sends the browser to `/success`
//! or `/error` and stops accepting connections as soon as one of those pages
//! has been served.

pub mod connection;
pub mod handlers;
pub mod pages;
pub mod query;
pub mod request;
pub mod response;
pub mod router;
pub mod state;

use color_eyre::eyre::{eyre, Result};
use std::future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use crate::auth::TokenExchanger;

pub use handlers::{AuthOutcome, ServerContext};
pub use pages::Pages;
pub use query::{parse_query, QueryParams};
pub use request::{HttpError, Method, Request, RequestLine};
pub use response::{Response, StatusCode};
pub use state::ExchangeState;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct TokenExchangeServer {
    listener: TcpListener,
    ctx: ServerContext,
    timeout: Option<Duration>,
}

impl TokenExchangeServer {
    /// Bind the listener. Port `0` picks a free port, see `local_addr`.
    pub async fn bind(host: &str, port: u16, exchanger: Arc<dyn TokenExchanger>) -> Result<Self> {
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|e| eyre!("failed to bind {}:{}: {}", host, port, e))?;

        Ok(TokenExchangeServer {
            listener,
            ctx: ServerContext::new(exchanger),
            timeout: None,
        })
    }

    /// give up if no terminal page was served within `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_pages(mut self, pages: Pages) -> Self {
        self.ctx = self.ctx.with_pages(pages);
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn state(&self) -> Arc<ExchangeState> {
        Arc::clone(&self.ctx.state)
    }

    /// Accept connections until the flow completes (or the timeout fires),
    /// let in-flight connections finish, then return the access token.
    /// An empty token means the flow was denied, failed or timed out.
    pub async fn serve(self) -> String {
        let TokenExchangeServer {
            listener,
            ctx,
            timeout,
        } = self;

        let ctx = Arc::new(ctx);
        let mut connections = JoinSet::new();

        let deadline = async move {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => future::pending().await,
            }
        };
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = ctx.state.wait_completed() => {
                    log::info!("authorization flow finished, closing listener");
                    break;
                }
                _ = &mut deadline => {
                    log::warn!("no authorization redirect received in time, closing listener");
                    ctx.state.stop();
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let ctx = Arc::clone(&ctx);
                        connections.spawn(async move {
                            connection::serve_connection(stream, peer, &ctx).await;
                        });
                    }
                    Err(err) => {
                        log::warn!("failed to accept connection: {}", err);
                        // back off on persistent errors such as EMFILE
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(err) = joined {
                        log::error!("connection task failed: {}", err);
                    }
                }
            }
        }

        // no new connections from here on; already accepted ones may finish their write
        drop(listener);

        while let Some(joined) = connections.join_next().await {
            if let Err(err) = joined {
                log::error!("connection task failed: {}", err);
            }
        }

        ctx.state.access_token().await
    }
}

/// Run the whole exchange on `host:port` and block until it is over.
pub async fn exchange(
    host: &str,
    port: u16,
    exchanger: Arc<dyn TokenExchanger>,
    timeout: Option<Duration>,
) -> Result<String> {
    let mut server = TokenExchangeServer::bind(host, port, exchanger).await?;
    if let Some(timeout) = timeout {
        server = server.with_timeout(timeout);
    }

    log::info!("token exchange server listening on {}", server.local_addr()?);

    Ok(server.serve().await)
}
