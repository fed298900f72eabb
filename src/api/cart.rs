// src/api/cart.rs
//
// The cart itself never touches the database; only adding an item does a
// point lookup to snapshot the influencer's name, image and package price.

use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::cart::NewCartItem;
use crate::db;
use crate::models::CartEntry;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartEntry>,
    pub total: Decimal,
    pub item_count: u32,
}

fn cart_view(state: &AppState, user_id: i32) -> CartView {
    CartView {
        items: state.carts.entries(user_id),
        total: state.carts.total(user_id),
        item_count: state.carts.item_count(user_id),
    }
}

#[utoipa::path(
    responses((status = 200, body = CartView)),
    tag = "cart"
)]
#[get("/cart")]
pub async fn get_cart(state: web::Data<AppState>, user_id: web::ReqData<i32>) -> impl Responder {
    HttpResponse::Ok().json(cart_view(&state, *user_id))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub influencer_id: i32,
    /// Package label: post | story | reel.
    pub package: String,
}

/// Adds one unit of a package to the caller's cart.
#[utoipa::path(
    request_body = AddCartItemRequest,
    responses(
        (status = 200, body = CartView),
        (status = 400, description = "unknown package label"),
        (status = 404, description = "influencer not found")
    ),
    tag = "cart"
)]
#[post("/cart/items")]
pub async fn add_item(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    payload: web::Json<AddCartItemRequest>,
) -> impl Responder {
    let user_id = *user_id;

    let influencer = match db::get_influencer(&state.pool, payload.influencer_id).await {
        Ok(Some(i)) => i,
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({"error": "influencer not found"}))
        }
        Err(e) => {
            eprintln!("add_item influencer lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let Some(unit_price) = influencer.package_price(&payload.package) else {
        return HttpResponse::BadRequest().json(json!({
            "error": "unknown package label, expected post, story or reel"
        }));
    };

    state.carts.add(
        user_id,
        NewCartItem {
            influencer_id: influencer.user_id,
            influencer_name: influencer.name,
            influencer_image: influencer.image_url,
            package: payload.package.clone(),
            unit_price,
        },
    );

    HttpResponse::Ok().json(cart_view(&state, user_id))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    /// Below 1 removes the entry.
    pub quantity: i64,
}

#[patch("/cart/items/{local_id}")]
pub async fn update_item(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<String>,
    payload: web::Json<UpdateQuantityRequest>,
) -> impl Responder {
    let user_id = *user_id;
    state
        .carts
        .update_quantity(user_id, &path.into_inner(), payload.quantity);
    HttpResponse::Ok().json(cart_view(&state, user_id))
}

#[delete("/cart/items/{local_id}")]
pub async fn remove_item(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<String>,
) -> impl Responder {
    let user_id = *user_id;
    state.carts.remove(user_id, &path.into_inner());
    HttpResponse::Ok().json(cart_view(&state, user_id))
}

#[delete("/cart")]
pub async fn clear_cart(state: web::Data<AppState>, user_id: web::ReqData<i32>) -> impl Responder {
    let user_id = *user_id;
    state.carts.clear(user_id);
    HttpResponse::Ok().json(cart_view(&state, user_id))
}
