use anyhow::Result;
use fireadmin::cli::start_users;

#[tokio::main]
async fn main() -> Result<()> {
    let action = start_users()?;

    action.execute().await?;

    Ok(())
}
