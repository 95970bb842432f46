//! Interactive line-driven inbox.
//!
//! Remote effects run in the background while input keeps being read. Each
//! outcome is fed back into the state as it arrives.

use std::io::Write as _;

use anyhow::Result;
use folio_core::inbox::{Direction, perform, save_favorites};
use folio_core::{
    Action, Effect, Filter, InboxController, InboxState, KeyValueStore, MessageGateway, MessageId,
};
use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

use crate::render;

const HELP: &str = "\
  j / k         next / previous message
  o <n|id>      open message by row number or id
  c             close preview
  s             toggle read/unread on the open message
  f             star / unstar the open message
  x [n|id]      select / unselect (defaults to the open message)
  a             select all visible
  u             clear selection
  S             toggle read/unread on the selection
  *             star / unstar the selection
  d             delete the open message
  D             delete all selected messages
  m             show more
  / <text>      search (empty clears)
  F <filter>    filter: all, unread, read, starred
  r             refresh
  l             list
  ?             help
  q             quit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Navigate(Direction),
    Open(String),
    Close,
    ToggleSeen,
    Star,
    Select(Option<String>),
    SelectAll,
    ClearSelection,
    BulkToggleSeen,
    BulkStar,
    Delete,
    BulkDelete,
    More,
    Search(String),
    Filter(Filter),
    Refresh,
    List,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if let Some(query) = line.strip_prefix('/') {
        return Some(Command::Search(query.trim().to_string()));
    }
    let (head, arg) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(h, a)| (h, a.trim()));

    Some(match (head, arg) {
        ("j", "") => Command::Navigate(Direction::Next),
        ("k", "") => Command::Navigate(Direction::Previous),
        ("o", target) if !target.is_empty() => Command::Open(target.to_string()),
        ("c", "") => Command::Close,
        ("s", "") => Command::ToggleSeen,
        ("f", "") => Command::Star,
        ("x", "") => Command::Select(None),
        ("x", target) => Command::Select(Some(target.to_string())),
        ("a", "") => Command::SelectAll,
        ("u", "") => Command::ClearSelection,
        ("S", "") => Command::BulkToggleSeen,
        ("*", "") => Command::BulkStar,
        ("d", "") => Command::Delete,
        ("D", "") => Command::BulkDelete,
        ("m", "") => Command::More,
        ("F", name) => Command::Filter(Filter::parse(name)?),
        ("r", "") => Command::Refresh,
        ("l" | "", "") => Command::List,
        ("?" | "h", "") => Command::Help,
        ("q", "") => Command::Quit,
        _ => return None,
    })
}

/// Remote calls started but not yet finished.
type InFlight<'a> = FuturesUnordered<LocalBoxFuture<'a, Vec<Action>>>;

fn start<'a, G: MessageGateway>(in_flight: &mut InFlight<'a>, gateway: &'a G, effect: Effect) {
    for leaf in effect.into_leaves() {
        in_flight.push(perform(gateway, leaf).boxed_local());
    }
}

/// Resolves a 1-based row number in the visible window, or a literal id.
fn resolve_target(state: &InboxState, target: &str) -> Option<MessageId> {
    if let Ok(row) = target.parse::<usize>() {
        let visible = state.visible();
        if let Some(message) = row.checked_sub(1).and_then(|i| visible.get(i)) {
            return Some(message.id.clone());
        }
    }
    let id = MessageId::from(target);
    state.message(&id).map(|_| id)
}

/// Runs the browse loop over `input` until `q` or end of input, then waits
/// for requests still in flight. Returns the final state.
pub async fn run<G, S, R>(inbox: InboxController<G, S>, input: R) -> Result<InboxState>
where
    G: MessageGateway,
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
{
    let (mut state, gateway, store) = inbox.into_parts();
    let mut lines = input.lines();
    let mut in_flight = InFlight::new();

    print!("{}", render::list(&state));
    println!("Type ? for help.");
    prompt()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(command) => {
                        let effect = execute(&mut state, command, &mut lines).await?;
                        start(&mut in_flight, &gateway, effect);
                    }
                    None => println!("Unknown command. Type ? for help."),
                }
                save_favorites(&mut state, &store).await;
                print_notices(&mut state);
                prompt()?;
            }
            Some(actions) = in_flight.next(), if !in_flight.is_empty() => {
                for action in actions {
                    start(&mut in_flight, &gateway, state.update(action));
                }
                save_favorites(&mut state, &store).await;
                println!();
                if in_flight.is_empty() {
                    print!("{}", render::list(&state));
                }
                print_notices(&mut state);
                prompt()?;
            }
        }
    }

    if !in_flight.is_empty() {
        println!("Finishing {} pending requests", in_flight.len());
    }
    while let Some(actions) = in_flight.next().await {
        for action in actions {
            start(&mut in_flight, &gateway, state.update(action));
        }
    }
    save_favorites(&mut state, &store).await;
    print_notices(&mut state);
    Ok(state)
}

/// Applies one command and returns the remote work it started.
async fn execute<R: AsyncBufRead + Unpin>(
    state: &mut InboxState,
    command: Command,
    lines: &mut Lines<R>,
) -> Result<Effect> {
    let effect = match command {
        Command::Navigate(direction) => {
            state.update(Action::Navigate(direction));
            show_preview(state);
            Effect::None
        }
        Command::Open(target) => {
            match resolve_target(state, &target) {
                Some(id) => {
                    state.update(Action::OpenPreview(id));
                    show_preview(state);
                }
                None => println!("No message {target}"),
            }
            Effect::None
        }
        Command::Close => {
            state.update(Action::ClosePreview);
            print!("{}", render::list(state));
            Effect::None
        }
        Command::ToggleSeen => match open_id(state) {
            Some(id) => {
                let effect = state.update(Action::ToggleSeen(id));
                show_preview(state);
                effect
            }
            None => Effect::None,
        },
        Command::Star => {
            if let Some(id) = open_id(state) {
                state.update(Action::ToggleFavorite(id));
                show_preview(state);
            }
            Effect::None
        }
        Command::Select(target) => {
            let id = match target {
                Some(target) => resolve_target(state, &target),
                None => open_id(state),
            };
            if let Some(id) = id {
                state.update(Action::ToggleSelect(id));
                println!("{}", render::status(state));
            }
            Effect::None
        }
        Command::SelectAll => {
            state.update(Action::SelectAllVisible);
            println!("{}", render::status(state));
            Effect::None
        }
        Command::ClearSelection => {
            state.update(Action::ClearSelection);
            println!("{}", render::status(state));
            Effect::None
        }
        Command::BulkToggleSeen => {
            if state.selection().is_empty() {
                println!("Nothing selected");
                return Ok(Effect::None);
            }
            let effect = state.update(Action::BulkToggleSeen);
            print!("{}", render::list(state));
            effect
        }
        Command::BulkStar => {
            if state.selection().is_empty() {
                println!("Nothing selected");
                return Ok(Effect::None);
            }
            state.update(Action::BulkToggleFavorite);
            print!("{}", render::list(state));
            Effect::None
        }
        Command::Delete => {
            let Some(id) = open_id(state) else {
                return Ok(Effect::None);
            };
            if confirm(&format!("Delete message {id}?"), lines).await? {
                state.update(Action::Delete(id))
            } else {
                Effect::None
            }
        }
        Command::BulkDelete => {
            let count = state.selection().len();
            if count == 0 {
                println!("Nothing selected");
                Effect::None
            } else if confirm(&format!("Delete {count} selected messages?"), lines).await? {
                state.update(Action::BulkDelete)
            } else {
                Effect::None
            }
        }
        Command::More => {
            state.update(Action::RevealMore);
            print!("{}", render::list(state));
            Effect::None
        }
        Command::Search(query) => {
            state.update(Action::SetSearch(query));
            print!("{}", render::list(state));
            Effect::None
        }
        Command::Filter(filter) => {
            state.update(Action::SetFilter(filter));
            print!("{}", render::list(state));
            Effect::None
        }
        Command::Refresh => state.update(Action::Refresh),
        Command::List => {
            print!("{}", render::list(state));
            Effect::None
        }
        Command::Help => {
            println!("{HELP}");
            Effect::None
        }
        Command::Quit => Effect::None,
    };
    if !effect.is_none() {
        debug!("Started {effect:?}");
    }
    Ok(effect)
}

/// Id of the open preview, or a hint if nothing is open.
fn open_id(state: &InboxState) -> Option<MessageId> {
    let id = state.preview().filter(|_| state.is_preview_open()).cloned();
    if id.is_none() {
        println!("No message open. Use o <n> or j/k first.");
    }
    id
}

fn show_preview(state: &InboxState) {
    if let Some(message) = state.preview_message() {
        print!("{}", render::detail(state, message));
    }
}

fn print_notices(state: &mut InboxState) {
    for notice in state.take_notices() {
        println!("{}", render::notice(&notice));
    }
}

fn prompt() -> Result<()> {
    print!("folio> ");
    std::io::stdout().flush()?;
    Ok(())
}

async fn confirm<R: AsyncBufRead + Unpin>(question: &str, lines: &mut Lines<R>) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
