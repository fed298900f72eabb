// src/api/checkout.rs

use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;

use crate::checkout::run_checkout;
use crate::db;
use crate::AppState;

/// Converts the caller's cart into collaboration and conversation
/// records, then clears the cart. Only brands can check out; failures
/// mid-run leave already-created records in place.
#[utoipa::path(
    responses(
        (status = 200, body = crate::checkout::CheckoutReport),
        (status = 400, description = "cart is empty"),
        (status = 403, description = "caller is not a brand")
    ),
    tag = "checkout"
)]
#[post("/checkout")]
pub async fn checkout(state: web::Data<AppState>, user_id: web::ReqData<i32>) -> impl Responder {
    let user_id = *user_id;

    let brand = match db::get_brand(&state.pool, user_id).await {
        Ok(Some(b)) => b,
        Ok(None) => {
            return HttpResponse::Forbidden().json(json!({
                "error": "only brands can check out"
            }))
        }
        Err(e) => {
            eprintln!("checkout brand lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let entries = state.carts.entries(user_id);
    if entries.is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "cart is empty"}));
    }

    match run_checkout(&state.pool, &state.ws_hub, &brand, &entries).await {
        Ok(report) => {
            state.carts.clear(user_id);
            HttpResponse::Ok().json(report)
        }
        Err(e) => {
            eprintln!("checkout error for brand {user_id}: {e}");
            HttpResponse::InternalServerError().json(json!({
                "error": "checkout failed, please try again"
            }))
        }
    }
}
