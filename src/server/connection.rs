use std::fmt;

use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::handlers::{dispatch, ServerContext};
use super::request::{read_request, HttpError, Request};
use super::response::Response;

/// Per-connection state machine. The server answers exactly one request per
/// connection and advertises `Connection: close` on every response.
enum Phase {
    ReadRequest,
    Dispatch(Request),
    WriteResponse(Response),
    Close,
}

/// Read the next request unless the server starts shutting down first. Idle
/// connections (browser preconnects) must not keep a finished or timed-out
/// server alive; once a request has been read it is always answered.
async fn read_or_finish<R>(reader: &mut R, ctx: &ServerContext) -> Option<Result<Request, HttpError>>
where
    R: AsyncBufRead + Unpin,
{
    tokio::select! {
        biased;
        read = read_request(reader) => Some(read),
        _ = ctx.state.wait_stopping() => None,
    }
}

/// Drive one accepted connection to completion. Never returns an error: every
/// failure is logged and ends only this connection.
pub async fn serve_connection<S, P>(stream: S, peer: P, ctx: &ServerContext)
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: fmt::Display,
{
    log::debug!("connection from {} established", peer);

    let mut stream = BufReader::new(stream);
    let mut phase = Phase::ReadRequest;

    loop {
        phase = match phase {
            Phase::ReadRequest => match read_or_finish(&mut stream, ctx).await {
                None => {
                    log::debug!("server stopping while {} was idle", peer);
                    Phase::Close
                }
                Some(Ok(request)) => Phase::Dispatch(request),
                Some(Err(HttpError::ConnectionClosed)) => {
                    log::debug!("{} closed the connection without a request", peer);
                    Phase::Close
                }
                // the start line was fine, so the client can still get an answer
                Some(Err(err @ HttpError::MalformedHeader(_))) => {
                    log::warn!("bad request from {}: {}", peer, err);
                    Phase::WriteResponse(Response::bad_request())
                }
                Some(Err(err)) => {
                    log::warn!("dropping connection from {}: {}", peer, err);
                    Phase::Close
                }
            },
            Phase::Dispatch(request) => Phase::WriteResponse(dispatch(&request, ctx).await),
            Phase::WriteResponse(response) => {
                log::info!("{} <- {}", peer, response.status);
                if let Err(err) = response.write_to(&mut stream).await {
                    log::warn!("failed to write response to {}: {}", peer, err);
                }
                Phase::Close
            }
            Phase::Close => break,
        };
    }

    if let Err(err) = stream.shutdown().await {
        log::debug!("error while closing connection from {}: {}", peer, err);
    }

    log::debug!("connection from {} closed", peer);
}
