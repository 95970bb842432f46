//! Subcommand handlers.
//!
//! Settings, session and storage are resolved once here and passed down as
//! an [`AppContext`].

use std::path::Path;

use anyhow::{Context, Result, bail};
use folio_core::{
    Action, AppContext, Favorites, HttpGateway, InboxController, InboxState, LoginRequest,
    MessageId, NewMessage, NoticeLevel, Settings, SqliteStore, credentials, validate_new_message,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::browse;
use crate::cli::{Cli, Commands};
use crate::render;

/// Runs the parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = load_settings(&settings_path).await?;

    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
        settings.validate()?;
    }

    let session = match credentials::load_session(&settings.api_base_url) {
        Ok(session) => session,
        Err(e) => {
            warn!("Could not read stored session: {e}");
            None
        }
    };
    let mut ctx = AppContext::new(settings).with_session(session);
    if let Some(dir) = cli.data_dir {
        ctx = ctx.with_data_dir(dir);
    }

    match cli.command {
        Commands::Login { user, password } => login(&ctx, user, password).await,
        Commands::Logout => logout(&ctx).await,
        Commands::List {
            filter,
            search,
            pages,
            all,
        } => {
            let mut inbox = open_inbox(&ctx).await?;
            inbox.update(Action::SetFilter(filter)).await;
            inbox.update(Action::SetSearch(search)).await;
            let reveals = if all { usize::MAX } else { pages.saturating_sub(1) };
            for _ in 0..reveals {
                if !inbox.state().has_more() {
                    break;
                }
                inbox.update(Action::RevealMore).await;
            }
            print!("{}", render::list(inbox.state()));
            Ok(())
        }
        Commands::Show { id } => {
            let inbox = open_inbox(&ctx).await?;
            let id = known_id(inbox.state(), &id)?;
            if let Some(message) = inbox.state().message(&id) {
                print!("{}", render::detail(inbox.state(), message));
            }
            Ok(())
        }
        Commands::ToggleSeen { id } => {
            let mut inbox = open_inbox(&ctx).await?;
            let id = known_id(inbox.state(), &id)?;
            inbox.dispatch(Action::ToggleSeen(id.clone())).await;
            report(inbox.state_mut())?;
            if let Some(message) = inbox.state().message(&id) {
                println!(
                    "{id} is now {}",
                    if message.is_seen { "read" } else { "unread" }
                );
            }
            Ok(())
        }
        Commands::Delete { id, yes } => {
            if !yes {
                bail!("refusing to delete without --yes");
            }
            let mut inbox = open_inbox(&ctx).await?;
            let id = known_id(inbox.state(), &id)?;
            inbox.dispatch(Action::Delete(id)).await;
            report(inbox.state_mut())
        }
        Commands::BulkDelete { ids, yes } => {
            if !yes {
                bail!("refusing to delete without --yes");
            }
            let mut inbox = open_inbox(&ctx).await?;
            for raw in &ids {
                let id = MessageId::from(raw.as_str());
                if inbox.state().message(&id).is_none() {
                    eprintln!("skipping unknown message {id}");
                } else if !inbox.state().is_selected(&id) {
                    inbox.update(Action::ToggleSelect(id)).await;
                }
            }
            if inbox.state().selection().is_empty() {
                bail!("nothing to delete");
            }
            inbox.dispatch(Action::BulkDelete).await;
            report(inbox.state_mut())
        }
        Commands::Star { id } => {
            let store = open_store(&ctx).await?;
            let mut favorites = Favorites::load(&store).await;
            let id = MessageId::from(id);
            let starred = favorites.toggle(&id);
            favorites
                .save(&store)
                .await
                .context("failed to save favorites")?;
            println!("{id} {}", if starred { "starred" } else { "unstarred" });
            Ok(())
        }
        Commands::Browse => {
            let inbox = open_inbox(&ctx).await?;
            browse::run(inbox, BufReader::new(tokio::io::stdin())).await?;
            Ok(())
        }
        Commands::Send {
            name,
            email,
            phone,
            category,
            message,
        } => {
            let new_message = NewMessage {
                name,
                email,
                phone,
                category,
                message,
            };
            send(&ctx, &new_message).await
        }
        Commands::Config {
            set_api_url,
            set_page_chunk,
            set_timeout,
        } => config(&settings_path, set_api_url, set_page_chunk, set_timeout).await,
    }
}

async fn load_settings(path: &Path) -> Result<Settings> {
    Settings::load_from(path)
        .await
        .with_context(|| format!("failed to load settings from {}", path.display()))
}

async fn open_store(ctx: &AppContext) -> Result<SqliteStore> {
    SqliteStore::open_in(&ctx.data_dir)
        .await
        .with_context(|| format!("failed to open local data in {}", ctx.data_dir.display()))
}

/// Builds an inbox for the logged-in admin and loads it.
async fn open_inbox(ctx: &AppContext) -> Result<InboxController<HttpGateway, SqliteStore>> {
    ctx.require_session()?;
    let gateway = HttpGateway::from_context(ctx)?;
    let store = open_store(ctx).await?;
    let mut inbox = InboxController::open(gateway, store, ctx.settings.page_chunk).await;

    inbox.dispatch(Action::Refresh).await;
    if let Some(error) = inbox.state().load_error() {
        bail!("could not load messages: {error}");
    }
    inbox.state_mut().take_notices();
    Ok(inbox)
}

fn known_id(state: &InboxState, raw: &str) -> Result<MessageId> {
    let id = MessageId::from(raw);
    if state.message(&id).is_none() {
        bail!("no message with id {raw}");
    }
    Ok(id)
}

/// Prints queued notices. Fails if any of them is an error.
fn report(state: &mut InboxState) -> Result<()> {
    let notices = state.take_notices();
    for notice in &notices {
        println!("{}", render::notice(notice));
    }
    if let Some(failed) = notices.iter().find(|n| n.level == NoticeLevel::Error) {
        bail!("{}", failed.text);
    }
    Ok(())
}

async fn login(ctx: &AppContext, user: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ").await?,
    };
    let gateway = HttpGateway::from_context(&ctx.clone().with_session(None))?;
    let session = gateway
        .login(&LoginRequest::new(user, password))
        .await
        .context("login failed")?;
    credentials::store_session(&ctx.settings.api_base_url, &session)?;
    info!("Logged in against {}", ctx.settings.api_base_url);
    println!("Logged in as {}", session.display_name());
    Ok(())
}

async fn logout(ctx: &AppContext) -> Result<()> {
    let Some(session) = &ctx.session else {
        println!("Not logged in");
        return Ok(());
    };
    let gateway = HttpGateway::from_context(ctx)?;
    if let Err(e) = gateway.logout(&session.session_id).await {
        warn!("Backend logout failed, forgetting session anyway: {e}");
    }
    credentials::delete_session(&ctx.settings.api_base_url)?;
    println!("Logged out");
    Ok(())
}

async fn send(ctx: &AppContext, message: &NewMessage) -> Result<()> {
    if let Err(errors) = validate_new_message(message) {
        for error in &errors {
            eprintln!("{}: {}", error.field(), error.message());
        }
        bail!("message not sent");
    }
    let gateway = HttpGateway::from_context(ctx)?;
    let confirmation = gateway.send_message(message).await?;
    println!(
        "{}",
        confirmation.unwrap_or_else(|| "Message sent".to_string())
    );
    Ok(())
}

/// Updates the stored settings. `--api-url` overrides are not persisted.
async fn config(
    path: &Path,
    api_url: Option<String>,
    page_chunk: Option<usize>,
    timeout: Option<u64>,
) -> Result<()> {
    let mut settings = load_settings(path).await?;
    let changed = api_url.is_some() || page_chunk.is_some() || timeout.is_some();
    if let Some(url) = api_url {
        settings.api_base_url = url;
    }
    if let Some(chunk) = page_chunk {
        settings.page_chunk = chunk;
    }
    if let Some(secs) = timeout {
        settings.request_timeout_secs = secs;
    }
    if changed {
        settings.save_to(path).await?;
        info!("Saved settings to {}", path.display());
    }
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// Reads one line from stdin after printing `label` to stderr.
pub async fn prompt(label: &str) -> Result<String> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(label.as_bytes()).await?;
    stderr.flush().await?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
