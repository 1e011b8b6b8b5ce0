use anyhow::Result;
use fireadmin::cli::start_purge;

#[tokio::main]
async fn main() -> Result<()> {
    let action = start_purge()?;

    action.execute().await?;

    Ok(())
}
