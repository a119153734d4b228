//! HISTORY line assembly: messages and chat events merged by wire timestamp.

/// Phrase rendered for a LEFT event.
pub const LEFT_PHRASE: &str = "покинул(а) чат";
/// Phrase rendered for any other recorded event type.
pub const JOINED_PHRASE: &str = "вошёл в чат";

/// The fixed phrase for an event type.
pub fn event_phrase(event_type: &str) -> &'static str {
    match event_type {
        "LEFT" => LEFT_PHRASE,
        _ => JOINED_PHRASE,
    }
}

/// A visible message, timestamp already in wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub msg_id: i64,
    pub ts: String,
    pub sender: String,
    pub content: String,
}

/// A chat event with the acting user resolved to a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub ts: String,
    pub username: String,
    pub event_type: String,
}

/// Merge messages and events into the HISTORY response line.
///
/// Both inputs must already be sorted by timestamp. The merge compares the
/// wire-format timestamps lexicographically; on a tie the message comes
/// first.
pub fn history_line(messages: &[MessageRow], events: &[EventRow]) -> String {
    let mut entries = Vec::with_capacity(messages.len() + events.len());
    let (mut i, mut j) = (0, 0);

    while i < messages.len() || j < events.len() {
        let take_message = match (messages.get(i), events.get(j)) {
            (Some(message), Some(event)) => message.ts <= event.ts,
            (Some(_), None) => true,
            _ => false,
        };

        if take_message {
            let m = &messages[i];
            entries.push(format!("[{}] {}: {} (id={})", m.ts, m.sender, m.content, m.msg_id));
            i += 1;
        } else {
            let e = &events[j];
            entries.push(format!("[{}] * {} {}", e.ts, e.username, event_phrase(&e.event_type)));
            j += 1;
        }
    }

    if entries.is_empty() {
        "HISTORY".to_string()
    } else {
        format!("HISTORY {}", entries.join(";"))
    }
}
