//! Pure mapping from an inbound record to its outbound response.

use crate::{MessageRecord, RecordId};

/// Prefix prepended to the original content when building a response.
pub const REPLY_PREFIX: &str = "Thanks for your message: ";

/// Build the response for one inbound record: sender and recipient
/// swapped, content prefixed with [`REPLY_PREFIX`], fresh identifier.
///
/// Pure and total: no side effects, no failure modes. Calling it twice on
/// the same record yields responses that differ only in their id.
pub fn build_response(record: &MessageRecord) -> MessageRecord {
    MessageRecord {
        id: RecordId::fresh(),
        sender: record.recipient.clone(),
        recipient: record.sender.clone(),
        content: format!("{REPLY_PREFIX}{}", record.content),
    }
}
