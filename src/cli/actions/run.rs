use super::{purge, users, Action};
use anyhow::Result;

pub(super) async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Users(args) => users::handle(args).await,
        Action::Purge(args) => purge::handle(args).await,
    }
}
