// src/inbox.rs
//
// Conversation-list shaping: resolving the counterpart the viewer talks
// to, ordering by most recent activity, and picking which messages a
// viewer's visit marks as read.

use std::cmp::max;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ChatMessage, Conversation, PartyType};

/// One inbox row as the viewer sees it: the other party's identity plus
/// the denormalized preview off the conversation record.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationView {
    pub id: i32,
    pub counterpart_id: i32,
    pub counterpart_name: String,
    pub counterpart_image: Option<String>,
    pub collaboration_id: Option<i32>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_message_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

pub fn view_for(conversation: &Conversation, viewer: PartyType) -> ConversationView {
    let (counterpart_id, counterpart_name) = match viewer {
        PartyType::Brand => (conversation.influencer_id, conversation.influencer_name.clone()),
        PartyType::Influencer => (conversation.brand_id, conversation.brand_name.clone()),
    };

    ConversationView {
        id: conversation.id,
        counterpart_id,
        counterpart_name,
        counterpart_image: None,
        collaboration_id: conversation.collaboration_id,
        last_message: conversation.last_message.clone(),
        last_message_at: conversation.last_message_at,
        last_message_by: conversation.last_message_by,
        created_at: conversation.created_at,
    }
}

/// A thread with no messages yet sorts by its creation time.
pub fn last_activity(view: &ConversationView) -> DateTime<Utc> {
    max(view.last_message_at.unwrap_or(view.created_at), view.created_at)
}

/// Most recently active first.
pub fn sort_by_activity(views: &mut [ConversationView]) {
    views.sort_by(|a, b| last_activity(b).cmp(&last_activity(a)));
}

/// Messages a viewer's visit flips to read: authored by the counterpart
/// and still unread. The viewer's own messages are never touched.
pub fn unread_counterpart_ids(messages: &[ChatMessage], viewer_id: i32) -> Vec<i32> {
    messages
        .iter()
        .filter(|m| !m.read && m.sender_id != viewer_id)
        .map(|m| m.id)
        .collect()
}
