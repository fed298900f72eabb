// src/api/admin.rs
//
// Collaboration status progresses here, not in the checkout flow: an
// admin moves records from pending through accepted/completed/cancelled.

use actix_web::{get, patch, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::db;
use crate::AppState;

const ALLOWED_STATUSES: &[&str] = &["pending", "accepted", "completed", "cancelled"];

async fn require_admin(pool: &PgPool, user_id: i32) -> Result<(), HttpResponse> {
    match db::is_admin(pool, user_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(HttpResponse::Forbidden().json(json!({"error": "admin only"}))),
        Err(e) => {
            eprintln!("admin check error: {e}");
            Err(HttpResponse::InternalServerError().finish())
        }
    }
}

#[get("/admin/stats")]
pub async fn stats(state: web::Data<AppState>, user_id: web::ReqData<i32>) -> impl Responder {
    if let Err(resp) = require_admin(&state.pool, *user_id).await {
        return resp;
    }

    match db::platform_stats(&state.pool).await {
        Ok(stats) => HttpResponse::Ok().json(json!({
            "brands": stats.brands,
            "influencers": stats.influencers,
            "collaborations": stats.collaborations,
            "conversations": stats.conversations,
        })),
        Err(e) => {
            eprintln!("admin stats error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/admin/collaborations")]
pub async fn list_collaborations(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
) -> impl Responder {
    if let Err(resp) = require_admin(&state.pool, *user_id).await {
        return resp;
    }

    match db::list_collaborations(&state.pool).await {
        Ok(collaborations) => HttpResponse::Ok().json(collaborations),
        Err(e) => {
            eprintln!("admin list_collaborations error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

#[patch("/admin/collaborations/{id}/status")]
pub async fn set_collaboration_status(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
    payload: web::Json<SetStatusRequest>,
) -> impl Responder {
    if let Err(resp) = require_admin(&state.pool, *user_id).await {
        return resp;
    }

    if !ALLOWED_STATUSES.contains(&payload.status.as_str()) {
        return HttpResponse::BadRequest().json(json!({"error": "invalid status"}));
    }

    match db::set_collaboration_status(&state.pool, path.into_inner(), &payload.status).await {
        Ok(0) => HttpResponse::NotFound().json(json!({"error": "collaboration not found"})),
        Ok(_) => HttpResponse::Ok().json(json!({"ok": true})),
        Err(e) => {
            eprintln!("set_collaboration_status error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
