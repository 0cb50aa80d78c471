//! Substation inspection server
//!
//! Serves the upload form and the report/export API.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` may carry SUBSTATION__* settings as well as the API key
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;

    server::start_server(config).await?;

    Ok(())
}
