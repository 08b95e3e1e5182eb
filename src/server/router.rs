use super::request::{Method, RequestLine};

pub const AUTH_PATH: &str = "/auth";
pub const SUCCESS_PATH: &str = "/success";
pub const ERROR_PATH: &str = "/error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Auth,
    Success,
    Error,
    /// anything that is not a GET
    BadMethod,
    NotFound,
}

// checked in order, first prefix match wins
const ROUTES: &[(&str, Route)] = &[
    (AUTH_PATH, Route::Auth),
    (SUCCESS_PATH, Route::Success),
    (ERROR_PATH, Route::Error),
];

pub fn route(line: &RequestLine) -> Route {
    if line.method != Method::Get {
        return Route::BadMethod;
    }

    let path = line.path();

    ROUTES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map(|(_, route)| *route)
        .unwrap_or(Route::NotFound)
}
