use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use sedr::cookies::PersistentCookieJar;
use sedr::net::log_exchange;
use sedr::{ClientConfig, ClientError, CompanionClient, LoginOutcome};

const EMAIL_ENV: &str = "SEDR_EMAIL";
const PASSWORD_ENV: &str = "SEDR_PASSWORD";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Base URL may be redirected through SEDR_BASEURL, everything else is fixed
    let config = ClientConfig::from_env().context("invalid base URL")?;
    let jar = PersistentCookieJar::open_file(&config.cookie_file)
        .with_context(|| format!("cannot open cookie file {}", config.cookie_file.display()))?;

    let mut client = CompanionClient::new(&config, Arc::new(jar))?.with_debugger(Arc::new(log_exchange));

    if client.need_login() {
        let email = std::env::var(EMAIL_ENV).map_err(|_| ClientError::CredentialsMissing)?;
        let password = std::env::var(PASSWORD_ENV).map_err(|_| ClientError::CredentialsMissing)?;

        if client.login(&email, &password).await? == LoginOutcome::VerificationRequired {
            client.verify_interactive(prompt_for_code).await?;
        }
        client.save_session().context("cannot save session")?;
    }

    let profile = client.get_profile().await?;

    let commander = &profile.commander;
    println!("Commander {} ({} credits)", commander.name, commander.credits);
    println!("Flying {} in {}", profile.ship.name, profile.last_system.name);
    if commander.docked {
        println!(
            "Docked at {} with {} commodities on the market",
            profile.last_starport.name,
            profile.last_starport.commodities.len()
        );
    }
    for (slot, ship) in &profile.ships {
        println!("  [{slot}] {} at {}", ship.name, ship.station.name);
    }

    Ok(())
}

fn prompt_for_code() -> io::Result<String> {
    print!("Verification code: ");
    io::stdout().flush()?;

    let mut code = String::new();
    io::stdin().lock().read_line(&mut code)?;
    Ok(code)
}
