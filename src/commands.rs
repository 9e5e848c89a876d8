//! Subcommand handlers. Each one loads what it needs from [`BcConfig`],
//! talks to the API and renders the result; errors bubble up to `main`
//! with context attached.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::api::{
    ButlerClient, RegisterRequest, Subscription, SubscriptionService, Tier, TokenPair,
};
use crate::browser::SystemBrowser;
use crate::config::BcConfig;
use crate::order::{FlowOutcome, FlowSettings, OrderFlow, PollOutcome};
use crate::prompt::{PromptError, Prompter, TerminalPrompter};
use crate::ui;

/// Resolves when the user presses Ctrl-C. Never resolves if the signal
/// handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn tier_option(tier: &Tier, subscriptions: &[Subscription]) -> String {
    let active = subscriptions
        .iter()
        .any(|s| s.tier == tier.tier && s.is_active());
    let mark = if active { " ✓" } else { "" };
    format!(
        "{}{mark}  ({} {}/{})",
        tier.name, tier.currency, tier.price, tier.billing_period
    )
}

/// Turn a cancelled prompt into `None`, keep real I/O failures.
fn optional<T>(answer: Result<T, PromptError>) -> Result<Option<T>> {
    match answer {
        Ok(v) => Ok(Some(v)),
        Err(PromptError::Cancelled) => Ok(None),
        Err(PromptError::Io(e)) => Err(e).context("terminal input failed"),
    }
}

/// `bc-cli subscriptions [tier]`: browse tiers and run the order flow.
pub async fn subscriptions(config: &BcConfig, tier_code: Option<&str>) -> Result<()> {
    let client = ButlerClient::from_config(config)?;
    let tiers = client
        .available_tiers()
        .await
        .context("failed to get available subscriptions")?;
    if tiers.is_empty() {
        println!("No subscription tiers available at this time.");
        return Ok(());
    }

    let mine = if config.is_authenticated() {
        client.list_subscriptions().await.unwrap_or_else(|e| {
            ui::warn(&format!("Could not fetch your active subscriptions: {e}"));
            Vec::new()
        })
    } else {
        Vec::new()
    };

    let mut prompter = TerminalPrompter::new();
    let tier = match tier_code {
        Some(code) => tiers
            .iter()
            .find(|t| t.tier == code)
            .with_context(|| format!("unknown subscription tier {code:?}"))?,
        None => {
            let mut options: Vec<String> = tiers.iter().map(|t| tier_option(t, &mine)).collect();
            options.push("← Exit".to_string());
            let picked = optional(
                prompter.prompt_select("Select a subscription tier to learn more", &options),
            )?;
            match picked {
                Some(i) if i < tiers.len() => &tiers[i],
                _ => return Ok(()),
            }
        }
    };

    let current = mine.iter().find(|s| s.tier == tier.tier);
    ui::print_tier_details(tier, current);

    if !config.is_authenticated() {
        println!("Please login first to subscribe:");
        println!("  bc-cli login");
        return Ok(());
    }
    if current.is_some_and(Subscription::is_active) {
        ui::ok(&format!("You are already subscribed to {}.", tier.name));
        return Ok(());
    }

    let label = format!("Would you like to subscribe to {} now?", tier.name);
    if optional(prompter.prompt_confirm(&label, true))? != Some(true) {
        return Ok(());
    }
    if config.is_token_expired() {
        bail!("your session has expired, run `bc-cli login` again");
    }

    let settings = FlowSettings::from_config(config);
    let outcome = OrderFlow::new(&client, &mut prompter, &SystemBrowser, settings)
        .run(tier, interrupted())
        .await?;

    match outcome {
        FlowOutcome::Declined => {}
        FlowOutcome::Activated {
            total_quantity_kg, ..
        } => ui::print_activated(total_quantity_kg, &tier.name),
        FlowOutcome::AwaitingPayment { order_id, outcome } => {
            if outcome == PollOutcome::Aborted {
                println!("\nStopped waiting for payment.");
            }
            ui::print_payment_pending(&order_id);
        }
    }
    Ok(())
}

pub async fn status(config: &BcConfig) -> Result<()> {
    if !config.is_authenticated() {
        println!("You are not logged in. Run `bc-cli login` first.");
        return Ok(());
    }
    let client = ButlerClient::from_config(config)?;
    let subs = client
        .list_subscriptions()
        .await
        .context("failed to list subscriptions")?;

    if subs.is_empty() {
        println!("You don't have any subscriptions yet. Run `bc-cli subscriptions` to pick one.");
        return Ok(());
    }
    println!("=== Your Subscriptions ===\n");
    for sub in &subs {
        ui::print_subscription(sub);
        println!();
    }
    Ok(())
}

pub async fn login(config: &mut BcConfig) -> Result<()> {
    let mut prompter = TerminalPrompter::new();
    if config.is_authenticated() {
        let again = optional(prompter.prompt_confirm(
            "You are already logged in. Log in with a different account?",
            true,
        ))?;
        if again != Some(true) {
            return Ok(());
        }
    }

    let Some(username) = optional(prompter.prompt_text("Username", "", "", false))? else {
        return Ok(());
    };
    let Some(password) = optional(prompter.prompt_password("Password"))? else {
        return Ok(());
    };

    println!("\nAuthenticating...");
    let client = ButlerClient::new(config.api_url.clone(), None, config.debug)?;
    let tokens = client
        .login(&username, &password)
        .await
        .context("login failed")?;

    store_tokens(config, tokens, &BcConfig::path())?;

    ui::ok("Successfully logged in!");
    println!("Welcome back, {username}!");
    Ok(())
}

/// `bc-cli signup`: create an account and store its tokens.
pub async fn signup(config: &mut BcConfig) -> Result<()> {
    let mut prompter = TerminalPrompter::new();
    println!("Welcome to Butler Coffee! Let's create your account.\n");

    let Some(username) = optional(prompter.prompt_text("Username", "", "", false))? else {
        return Ok(());
    };
    let Some(email) = optional(prompter.prompt_text("Email", "", "", false))? else {
        return Ok(());
    };
    let Some(password) = optional(prompter.prompt_password("Password"))? else {
        return Ok(());
    };
    let Some(confirmation) = optional(prompter.prompt_password("Confirm Password"))? else {
        return Ok(());
    };
    let password = matching_password(password, &confirmation)?;
    let Some(code) = optional(prompter.prompt_text(
        "Invitation Code",
        "",
        "Leave empty to skip",
        true,
    ))?
    else {
        return Ok(());
    };

    println!("\nCreating account...");
    let client = ButlerClient::new(config.api_url.clone(), None, config.debug)?;
    let req = RegisterRequest {
        username,
        email,
        password,
        code: Some(code).filter(|c| !c.is_empty()),
    };
    let user = client
        .register(&req)
        .await
        .context("failed to create account")?;
    let user_id = user.id.clone();
    store_tokens(config, user.into(), &BcConfig::path())?;

    ui::ok("Account created successfully!");
    println!("User ID: {user_id}");
    println!("\nYou are now logged in and ready to use Butler Coffee CLI!");
    Ok(())
}

fn matching_password(password: String, confirmation: &str) -> Result<String> {
    if password != confirmation {
        bail!("passwords do not match");
    }
    Ok(password)
}

/// Replace the stored tokens and write the config to `path`.
fn store_tokens(config: &mut BcConfig, tokens: TokenPair, path: &Path) -> Result<()> {
    config.access_token = tokens.access_token;
    config.refresh_token = tokens.refresh_token;
    config.expires_at = tokens.expires_at;
    config.refresh_token_expires_at = tokens.refresh_token_expires_at;
    config.save_to(path).context("failed to save config")
}

pub fn logout(config: &mut BcConfig) -> Result<()> {
    if !config.is_authenticated() {
        println!("You are not logged in.");
        return Ok(());
    }
    config.clear_tokens();
    config.save().context("failed to save config")?;
    ui::ok("Logged out. See you soon!");
    Ok(())
}
