use crate::cli::globals::GlobalArgs;
use crate::identity::{AccountError, AccountRecord, IdentityClient, Lookup};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub enum UserCommand {
    Create {
        email: String,
        password: SecretString,
        display_name: Option<String>,
    },
    Get {
        email: String,
    },
    List,
    UpdatePassword {
        email: String,
        password: SecretString,
    },
    Delete {
        email: String,
    },
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub auth_url: String,
    pub command: UserCommand,
}

fn describe(record: &AccountRecord) -> String {
    format!(
        "{} (uid: {}, display name: {}, email verified: {}{})",
        record.email.as_deref().unwrap_or("<no email>"),
        record.uid,
        record.display_name.as_deref().unwrap_or("<none>"),
        record.email_verified,
        if record.disabled { ", disabled" } else { "" }
    )
}

/// Run one identity operation and print its outcome.
///
/// # Errors
/// Returns an error if credentials cannot be loaded or the operation fails.
pub async fn handle(args: Args) -> Result<()> {
    let auth = args.globals.connect().await?;
    let client = IdentityClient::new(&auth, &args.auth_url);

    match args.command {
        UserCommand::Create {
            email,
            password,
            display_name,
        } => {
            let provisioned = client
                .create_if_absent(&email, &password, display_name.as_deref())
                .await?;

            if provisioned.was_created() {
                println!("Created account: {}", describe(provisioned.record()));
            } else {
                println!(
                    "Account already exists, no action taken: {}",
                    describe(provisioned.record())
                );
            }
        }
        UserCommand::Get { email } => match client.lookup_by_email(&email).await? {
            Lookup::Found(record) => println!("{}", describe(&record)),
            Lookup::NotFound => return Err(AccountError::NotFound(email).into()),
        },
        UserCommand::List => {
            let accounts = client.list_all().await?;

            for record in &accounts {
                println!(
                    "{}\t{}",
                    record.email.as_deref().unwrap_or("<no email>"),
                    record.uid
                );
            }

            println!("Total accounts: {}", accounts.len());
        }
        UserCommand::UpdatePassword { email, password } => {
            let record = client.update_password(&email, &password).await?;
            println!("Password updated: {}", describe(&record));
        }
        UserCommand::Delete { email } => {
            let record = client.delete(&email).await?;
            println!("Deleted account: {}", describe(&record));
        }
    }

    Ok(())
}
