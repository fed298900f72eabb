// src/api/conversations.rs

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::models::{Conversation, PartyType};
use crate::{db, inbox, ws, AppState};

fn is_participant(conversation: &Conversation, user_id: i32) -> bool {
    conversation.brand_id == user_id || conversation.influencer_id == user_id
}

/// The caller's inbox: one row per counterpart, most recent activity first.
#[utoipa::path(
    responses(
        (status = 200, description = "conversation list, most recent activity first"),
        (status = 404, description = "caller has no profile")
    ),
    tag = "conversations"
)]
#[get("/conversations")]
pub async fn list_conversations(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
) -> impl Responder {
    let user_id = *user_id;

    let party = match db::party_type_of(&state.pool, user_id).await {
        Ok(Some(party)) => party,
        Ok(None) => return HttpResponse::NotFound().json(json!({"error": "profile not found"})),
        Err(e) => {
            eprintln!("list_conversations party lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let conversations = match db::list_conversations_for(&state.pool, party, user_id).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("list_conversations db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut views = Vec::with_capacity(conversations.len());
    for conversation in &conversations {
        let mut view = inbox::view_for(conversation, party);
        // brands see the influencer's avatar next to the thread
        if party == PartyType::Brand {
            match db::get_influencer(&state.pool, view.counterpart_id).await {
                Ok(Some(influencer)) => view.counterpart_image = influencer.image_url,
                Ok(None) => {}
                Err(e) => eprintln!("list_conversations counterpart lookup error: {e}"),
            }
        }
        views.push(view);
    }

    inbox::sort_by_activity(&mut views);
    HttpResponse::Ok().json(views)
}

/// Messages oldest-first. Opening the feed marks every unread message
/// authored by the counterpart as read; the viewer's own are untouched.
#[get("/conversations/{id}/messages")]
pub async fn list_messages(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
) -> impl Responder {
    let user_id = *user_id;
    let conversation_id = path.into_inner();

    let conversation = match db::get_conversation(&state.pool, conversation_id).await {
        Ok(Some(c)) => c,
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({"error": "conversation not found"}))
        }
        Err(e) => {
            eprintln!("list_messages conversation lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if !is_participant(&conversation, user_id) {
        return HttpResponse::Forbidden().json(json!({"error": "not a participant"}));
    }

    let mut messages = match db::list_messages(&state.pool, conversation_id).await {
        Ok(m) => m,
        Err(e) => {
            eprintln!("list_messages db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // best-effort: a failed read-flag write never blocks the feed
    let unread = inbox::unread_counterpart_ids(&messages, user_id);
    match db::mark_messages_read(&state.pool, &unread).await {
        Ok(_) => {
            for message in &mut messages {
                if unread.contains(&message.id) {
                    message.read = true;
                }
            }
        }
        Err(e) => eprintln!("mark_messages_read error: {e}"),
    }

    HttpResponse::Ok().json(messages)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub message: String,
}

/// Appends a message, refreshes the thread preview and pushes inbox
/// events. The two writes are not atomic; a crash in between leaves a
/// stale preview, never a broken feed.
#[post("/conversations/{id}/messages")]
pub async fn send_message(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
    payload: web::Json<SendMessageRequest>,
) -> impl Responder {
    let user_id = *user_id;
    let conversation_id = path.into_inner();

    let body = payload.message.trim();
    if body.is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "message is empty"}));
    }

    let conversation = match db::get_conversation(&state.pool, conversation_id).await {
        Ok(Some(c)) => c,
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({"error": "conversation not found"}))
        }
        Err(e) => {
            eprintln!("send_message conversation lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if !is_participant(&conversation, user_id) {
        return HttpResponse::Forbidden().json(json!({"error": "not a participant"}));
    }

    let (sender_type, sender_name) = if user_id == conversation.brand_id {
        (PartyType::Brand.as_str(), conversation.brand_name.clone())
    } else {
        (
            PartyType::Influencer.as_str(),
            conversation.influencer_name.clone(),
        )
    };

    let message = match db::insert_message(
        &state.pool,
        conversation_id,
        user_id,
        &sender_name,
        sender_type,
        body,
    )
    .await
    {
        Ok(m) => m,
        Err(e) => {
            eprintln!("send_message insert error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = db::touch_conversation_preview(
        &state.pool,
        conversation_id,
        &message.body,
        message.created_at,
        user_id,
    )
    .await
    {
        eprintln!("send_message preview update error: {e}");
    }

    ws::notify_message(&state.ws_hub, &conversation, &message);
    match db::get_conversation(&state.pool, conversation_id).await {
        Ok(Some(updated)) => ws::notify_conversation(&state.ws_hub, &updated),
        Ok(None) => {}
        Err(e) => eprintln!("send_message refetch error: {e}"),
    }

    HttpResponse::Ok().json(message)
}
