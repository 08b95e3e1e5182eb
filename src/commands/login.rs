use color_eyre::eyre::{eyre, Result};
use std::sync::Arc;

use crate::api::StepikAPIClient;
use crate::auth::{authorization_url, StepikTokenExchanger};
use crate::config::Config;
use crate::server::TokenExchangeServer;
use crate::{cheer, complain, greet, say};

/// Run the authorization code flow: bind the redirect server, send the user
/// to Stepik and wait until the browser lands on a terminal page.
/// `None` means the user declined, the exchange failed or we timed out.
pub async fn obtain_token(config: &Config, open_browser: bool) -> Result<Option<String>> {
    let exchanger = Arc::new(StepikTokenExchanger::from_config(config)?);
    let url = authorization_url(config)?;

    // bind before the browser is sent anywhere, the redirect must find us listening
    let server =
        TokenExchangeServer::bind(&config.redirect_host, config.redirect_port, exchanger)
            .await?
            .with_timeout(config.login_timeout);

    log::info!("waiting for redirect on {}", server.local_addr()?);

    if open_browser {
        match open::that(url.as_str()) {
            Ok(()) => say!("opened the authorization page in your browser"),
            Err(err) => {
                complain!("could not open a browser: {}", err);
                say!("open this URL to continue: {}", url);
            }
        }
    } else {
        say!("open this URL to continue: {}", url);
    }

    say!(
        "waiting up to {}s for authorization...",
        config.login_timeout.as_secs()
    );

    let token = server.serve().await;

    Ok(if token.is_empty() { None } else { Some(token) })
}

/// token from `STEPIK_TOKEN`, or a fresh one from the browser flow
pub async fn resolve_token(config: &Config, open_browser: bool) -> Result<String> {
    if let Some(token) = config.expose_token() {
        log::debug!("using token from STEPIK_TOKEN");
        return Ok(token.to_string());
    }

    obtain_token(config, open_browser)
        .await?
        .ok_or_else(|| eyre!("authorization failed or was denied"))
}

/// handle `stepikctl login [--no-browser] [--print-token]`
pub async fn login(config: &Config, open_browser: bool, print_token: bool) -> Result<()> {
    let token = obtain_token(config, open_browser)
        .await?
        .ok_or_else(|| eyre!("authorization failed or was denied"))?;

    let client = StepikAPIClient::from_config(config, &token);
    let user_id = client.me().await?;

    greet!(user_id);
    cheer!("logged in");

    if print_token {
        say!("export STEPIK_TOKEN={}", token);
    } else {
        say!("run with `--print-token` to reuse this session via STEPIK_TOKEN");
    }

    Ok(())
}
