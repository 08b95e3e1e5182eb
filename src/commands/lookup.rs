use color_eyre::eyre::Result;

use crate::api::StepikAPIClient;
use crate::commands::login::resolve_token;
use crate::config::Config;
use crate::message::Message;

async fn client(config: &Config, open_browser: bool) -> Result<StepikAPIClient> {
    let token = resolve_token(config, open_browser).await?;
    Ok(StepikAPIClient::from_config(config, &token))
}

/// handle `stepikctl course --id <ID>`
pub async fn course(config: &Config, id: i64, open_browser: bool) -> Result<()> {
    let course = client(config, open_browser).await?.course(id).await?;
    Message::print_course(&course);
    Ok(())
}

/// handle `stepikctl courses --ids <ID,ID,...>`
pub async fn courses(config: &Config, ids: &[i64], open_browser: bool) -> Result<()> {
    let courses = client(config, open_browser).await?.courses(ids).await?;
    Message::print_courses(&courses);
    Ok(())
}

/// handle `stepikctl section --id <ID>`
pub async fn section(config: &Config, id: i64, open_browser: bool) -> Result<()> {
    let section = client(config, open_browser).await?.section(id).await?;
    Message::print_section(&section);
    Ok(())
}

/// handle `stepikctl sections --ids <ID,ID,...>`
pub async fn sections(config: &Config, ids: &[i64], open_browser: bool) -> Result<()> {
    let sections = client(config, open_browser).await?.sections(ids).await?;
    Message::print_sections(&sections);
    Ok(())
}
