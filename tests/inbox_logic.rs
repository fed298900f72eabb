use chrono::{Duration, Utc};

use collabzz::inbox::{sort_by_activity, unread_counterpart_ids, view_for, ConversationView};
use collabzz::models::{ChatMessage, Conversation, PartyType};

fn conversation(id: i32, brand_id: i32, influencer_id: i32) -> Conversation {
    Conversation {
        id,
        brand_id,
        influencer_id,
        brand_name: format!("brand-{brand_id}"),
        influencer_name: format!("influencer-{influencer_id}"),
        collaboration_id: None,
        last_message: None,
        last_message_at: None,
        last_message_by: None,
        created_at: Utc::now(),
    }
}

fn message(id: i32, sender_id: i32, read: bool) -> ChatMessage {
    ChatMessage {
        id,
        conversation_id: 1,
        sender_id,
        sender_name: format!("user-{sender_id}"),
        sender_type: "brand".to_string(),
        body: format!("message {id}"),
        read,
        created_at: Utc::now(),
    }
}

#[test]
fn views_resolve_the_counterpart_for_each_party() {
    let conv = conversation(1, 100, 200);

    let brand_view = view_for(&conv, PartyType::Brand);
    assert_eq!(brand_view.counterpart_id, 200);
    assert_eq!(brand_view.counterpart_name, "influencer-200");

    let influencer_view = view_for(&conv, PartyType::Influencer);
    assert_eq!(influencer_view.counterpart_id, 100);
    assert_eq!(influencer_view.counterpart_name, "brand-100");
}

#[test]
fn conversations_sort_by_last_message_time_descending() {
    let base = Utc::now();
    let mut views: Vec<ConversationView> = (1..=3)
        .map(|i| {
            let mut view = view_for(&conversation(i, 100, 200 + i), PartyType::Brand);
            view.created_at = base - Duration::days(30);
            // T1 < T2 < T3
            view.last_message_at = Some(base + Duration::minutes(i64::from(i)));
            view
        })
        .collect();

    sort_by_activity(&mut views);

    let order: Vec<i32> = views.iter().map(|v| v.id).collect();
    assert_eq!(order, vec![3, 2, 1]);
}

#[test]
fn threads_without_messages_sort_by_creation_time() {
    let base = Utc::now();

    let mut old_active = view_for(&conversation(1, 100, 201), PartyType::Brand);
    old_active.created_at = base - Duration::days(10);
    old_active.last_message_at = Some(base - Duration::days(2));

    let mut fresh_silent = view_for(&conversation(2, 100, 202), PartyType::Brand);
    fresh_silent.created_at = base;
    fresh_silent.last_message_at = None;

    let mut views = vec![old_active, fresh_silent];
    sort_by_activity(&mut views);

    assert_eq!(views[0].id, 2);
    assert_eq!(views[1].id, 1);
}

#[test]
fn unread_selection_targets_only_the_counterparts_messages() {
    let viewer = 100;
    let counterpart = 200;

    let messages = vec![
        message(1, counterpart, false),
        message(2, counterpart, false),
        message(3, viewer, false),      // viewer's own, stays untouched
        message(4, counterpart, true),  // already read
        message(5, counterpart, false),
    ];

    let ids = unread_counterpart_ids(&messages, viewer);
    assert_eq!(ids, vec![1, 2, 5]);
}

#[test]
fn fully_read_feed_selects_nothing() {
    let messages = vec![message(1, 200, true), message(2, 100, false)];
    assert!(unread_counterpart_ids(&messages, 100).is_empty());
}
