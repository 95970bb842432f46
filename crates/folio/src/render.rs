//! Plain-text rendering of inbox state.

use std::fmt::Write as _;

use folio_core::message::format_timestamp;
use folio_core::{InboxState, Message, Notice, NoticeLevel};

const SNIPPET_CHARS: usize = 48;

/// One list row: selection, unread, star and busy markers, then the summary.
pub fn row(state: &InboxState, index: usize, message: &Message) -> String {
    let selected = if state.is_selected(&message.id) { 'x' } else { ' ' };
    let unread = if message.is_seen { ' ' } else { '\u{25CF}' };
    let starred = if state.is_starred(&message.id) { '\u{2605}' } else { ' ' };
    let busy = if state.is_busy(&message.id) { '~' } else { ' ' };
    let cursor = if state.preview() == Some(&message.id) { '>' } else { ' ' };

    format!(
        "{cursor}[{selected}] {unread}{starred}{busy} {:>3}  {:<8} {:<22} {:<22} {:<18} {}",
        index + 1,
        message.id,
        truncate(&message.name, 22),
        truncate(&message.email, 22),
        truncate(&message.purpose, 18),
        message.snippet(SNIPPET_CHARS),
    )
}

/// The visible window followed by a status line.
pub fn list(state: &InboxState) -> String {
    let mut out = String::new();
    if let Some(error) = state.load_error() {
        let _ = writeln!(out, "Could not load messages: {error}");
    }

    let visible = state.visible();
    if visible.is_empty() {
        out.push_str("No messages\n");
    }
    for (i, message) in visible.iter().enumerate() {
        out.push_str(&row(state, i, message));
        out.push('\n');
    }
    out.push_str(&status(state));
    out.push('\n');
    out
}

/// Counts, filter and search in one line.
pub fn status(state: &InboxState) -> String {
    let mut line = format!(
        "{} of {} shown | {} total, {} unread, {} starred | filter: {}",
        state.visible().len(),
        state.filtered().len(),
        state.total_count(),
        state.unread_count(),
        state.favorites().len(),
        state.filter().label(),
    );
    if !state.search().trim().is_empty() {
        let _ = write!(line, " | search: \"{}\"", state.search());
    }
    if !state.selection().is_empty() {
        let _ = write!(line, " | {} selected", state.selection().len());
    }
    if state.busy_count() > 0 {
        let _ = write!(line, " | {} pending", state.busy_count());
    }
    if state.has_more() {
        line.push_str(" | more available");
    }
    line
}

/// Full message detail.
pub fn detail(state: &InboxState, message: &Message) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Id:       {}", message.id);
    let _ = writeln!(out, "From:     {} <{}>", message.name, message.email);
    if let Some(phone) = message.phone.as_deref().filter(|p| !p.is_empty()) {
        let _ = writeln!(out, "Phone:    {phone}");
    }
    let _ = writeln!(out, "Purpose:  {}", message.purpose);
    let _ = writeln!(out, "Received: {}", format_timestamp(&message.created_at));
    if let Some(ip) = &message.ip_address {
        let _ = writeln!(out, "IP:       {ip}");
    }
    let _ = writeln!(
        out,
        "Status:   {}{}",
        if message.is_seen { "read" } else { "unread" },
        if state.is_starred(&message.id) { ", starred" } else { "" },
    );
    out.push('\n');
    out.push_str(&message.body);
    out.push('\n');
    out
}

/// A notice prefixed by its level.
pub fn notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("ok: {}", notice.text),
        NoticeLevel::Error => format!("error: {}", notice.text),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('\u{2026}');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Action, Favorites, MessageId};

    fn state_with(messages: Vec<Message>) -> InboxState {
        let mut state = InboxState::new(Favorites::new(), 12);
        state.update(Action::Refresh);
        state.update(Action::Loaded(Ok(messages)));
        state
    }

    fn message(id: &str) -> Message {
        Message {
            id: MessageId::from(id),
            name: "Jane Roe".to_string(),
            email: "jane@example.com".to_string(),
            phone: Some("555-0100".to_string()),
            purpose: "Collaboration".to_string(),
            body: "Let's build\nsomething together.".to_string(),
            created_at: "2025-05-04T10:00:00Z".to_string(),
            is_seen: false,
            ip_address: None,
        }
    }

    #[test]
    fn test_row_markers() {
        let mut state = state_with(vec![message("7")]);
        let id = MessageId::from("7");
        state.update(Action::ToggleFavorite(id.clone()));
        state.update(Action::ToggleSelect(id.clone()));

        let line = row(&state, 0, &state.messages()[0]);
        assert!(line.starts_with(" [x] \u{25CF}\u{2605}"));
        assert!(line.contains("Let's build something together."));
    }

    #[test]
    fn test_status_mentions_search_and_selection() {
        let mut state = state_with(vec![message("1"), message("2")]);
        state.update(Action::SetSearch("jane".into()));
        state.update(Action::ToggleSelect(MessageId::from("1")));
        let line = status(&state);
        assert!(line.starts_with("2 of 2 shown"));
        assert!(line.contains("search: \"jane\""));
        assert!(line.contains("1 selected"));
        assert!(!line.contains("more available"));
        assert!(!line.contains("pending"));
    }

    #[test]
    fn test_status_counts_pending_mutations() {
        let mut state = state_with(vec![message("1"), message("2")]);
        state.update(Action::ToggleSeen(MessageId::from("1")));
        state.update(Action::Delete(MessageId::from("2")));
        assert!(status(&state).ends_with(" | 2 pending"));

        let line = row(&state, 0, &state.messages()[0]);
        assert_eq!(line.chars().nth(7), Some('~'));
    }

    #[test]
    fn test_empty_list() {
        let state = state_with(Vec::new());
        assert!(list(&state).starts_with("No messages\n"));
    }

    #[test]
    fn test_detail_includes_phone() {
        let state = state_with(vec![message("1")]);
        let text = detail(&state, &state.messages()[0]);
        assert!(text.contains("Phone:    555-0100"));
        assert!(text.contains("Status:   unread"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd\u{2026}");
    }
}
