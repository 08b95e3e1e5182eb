use std::sync::Arc;

use crate::auth::TokenExchanger;

use super::pages::Pages;
use super::query::{parse_query, QueryParams};
use super::request::Request;
use super::response::{Response, CONTENT_TYPE_HTML};
use super::router::{route, Route, ERROR_PATH, SUCCESS_PATH};
use super::state::ExchangeState;

const CODE_PARAM: &str = "code";
const ERROR_PARAM: &str = "error";

/// Everything a handler needs; shared by all connections of one server.
pub struct ServerContext {
    pub state: Arc<ExchangeState>,
    pub exchanger: Arc<dyn TokenExchanger>,
    pub pages: Pages,
}

impl ServerContext {
    pub fn new(exchanger: Arc<dyn TokenExchanger>) -> Self {
        Self {
            state: Arc::new(ExchangeState::new()),
            exchanger,
            pages: Pages::default(),
        }
    }

    pub fn with_pages(mut self, pages: Pages) -> Self {
        self.pages = pages;
        self
    }
}

/// How an `/auth` redirect was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// the user declined access (`error` in the query)
    Denied(String),
    MissingCode,
    Exchanged(String),
    ExchangeFailed(String),
}

impl AuthOutcome {
    pub fn into_response(self) -> Response {
        match self {
            AuthOutcome::Denied(_) | AuthOutcome::ExchangeFailed(_) => {
                Response::redirect(ERROR_PATH)
            }
            AuthOutcome::MissingCode => Response::bad_request(),
            AuthOutcome::Exchanged(_) => Response::redirect(SUCCESS_PATH),
        }
    }
}

/// Resolve the `/auth` query. Makes at most one exchange call and never retries.
pub async fn authorize(query: &QueryParams, exchanger: &dyn TokenExchanger) -> AuthOutcome {
    if let Some(reason) = query.get(ERROR_PARAM) {
        return AuthOutcome::Denied(reason.to_string());
    }

    let Some(code) = query.get(CODE_PARAM) else {
        return AuthOutcome::MissingCode;
    };

    match exchanger.exchange_code(code).await {
        Ok(token) => AuthOutcome::Exchanged(token),
        Err(err) => AuthOutcome::ExchangeFailed(err.to_string()),
    }
}

async fn handle_auth(request: &Request, ctx: &ServerContext) -> Response {
    let query = match parse_query(&request.line.target) {
        Ok(query) => query,
        Err(err) => {
            log::warn!("rejecting /auth redirect: {}", err);
            return Response::bad_request();
        }
    };

    let outcome = authorize(&query, ctx.exchanger.as_ref()).await;

    match &outcome {
        AuthOutcome::Denied(reason) => {
            log::warn!("authorization denied by user: {}", reason);
        }
        AuthOutcome::MissingCode => {
            log::warn!("auth redirect carries neither code nor error");
        }
        AuthOutcome::Exchanged(token) => {
            log::debug!("token was exchanged successfully");
            if !ctx.state.store_token(token.clone()).await {
                log::warn!("access token already stored, ignoring the new one");
            }
        }
        AuthOutcome::ExchangeFailed(err) => {
            log::error!("error during token exchange: {}", err);
        }
    }

    outcome.into_response()
}

fn handle_terminal_page(ctx: &ServerContext, body: &'static [u8]) -> Response {
    if ctx.state.complete() {
        log::info!("authorization flow completed");
    }

    Response::ok(CONTENT_TYPE_HTML, body)
}

/// Route the request and produce exactly one response.
pub async fn dispatch(request: &Request, ctx: &ServerContext) -> Response {
    let route = route(&request.line);
    log::debug!("{} -> {:?}", request.line, route);

    match route {
        Route::Auth => handle_auth(request, ctx).await,
        Route::Success => handle_terminal_page(ctx, ctx.pages.success),
        Route::Error => handle_terminal_page(ctx, ctx.pages.error),
        Route::BadMethod => {
            log::warn!("unsupported method {}", request.line.method);
            Response::bad_request()
        }
        Route::NotFound => Response::not_found(),
    }
}
