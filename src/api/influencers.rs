// src/api/influencers.rs

use actix_web::{get, put, web, HttpResponse, Responder};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::db::{self, InfluencerFilter};
use crate::models::PartyType;
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct InfluencerQuery {
    pub category: Option<String>,
    pub platform: Option<String>,
    /// Case-insensitive substring match on the display name.
    pub search: Option<String>,
    /// Upper bound on the post package price.
    pub max_price: Option<Decimal>,
}

/// Public talent directory with optional filters.
#[utoipa::path(
    params(InfluencerQuery),
    responses((status = 200, body = [crate::models::Influencer])),
    tag = "influencers"
)]
#[get("/influencers")]
pub async fn list_influencers(
    state: web::Data<AppState>,
    query: web::Query<InfluencerQuery>,
) -> impl Responder {
    let query = query.into_inner();
    let filter = InfluencerFilter {
        category: query.category,
        platform: query.platform,
        search: query.search,
        max_price: query.max_price,
    };

    match db::list_influencers(&state.pool, &filter).await {
        Ok(influencers) => HttpResponse::Ok().json(influencers),
        Err(e) => {
            eprintln!("list_influencers db error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/influencers/{id}")]
pub async fn get_influencer(state: web::Data<AppState>, path: web::Path<i32>) -> impl Responder {
    match db::get_influencer(&state.pool, path.into_inner()).await {
        Ok(Some(influencer)) => HttpResponse::Ok().json(influencer),
        Ok(None) => HttpResponse::NotFound().json(json!({"error": "influencer not found"})),
        Err(e) => {
            eprintln!("get_influencer db error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Fields are optional; absent ones keep their current value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    // brand fields
    pub company: Option<String>,
    pub website: Option<String>,
    // influencer fields
    pub category: Option<String>,
    pub platform: Option<String>,
    pub followers: Option<i32>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub post_price: Option<Decimal>,
    pub story_price: Option<Decimal>,
    pub reel_price: Option<Decimal>,
}

/// Profile edit for the signed-in party; dispatches on their party type.
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    payload: web::Json<UpdateProfileRequest>,
) -> impl Responder {
    let user_id = *user_id;
    let p = payload.into_inner();

    let party = match db::party_type_of(&state.pool, user_id).await {
        Ok(Some(party)) => party,
        Ok(None) => return HttpResponse::NotFound().json(json!({"error": "profile not found"})),
        Err(e) => {
            eprintln!("update_profile party lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let result = match party {
        PartyType::Brand => {
            sqlx::query(
                r#"UPDATE brands
                   SET name = COALESCE($1, name),
                       company = COALESCE($2, company),
                       website = COALESCE($3, website)
                   WHERE user_id = $4"#,
            )
            .bind(p.name)
            .bind(p.company)
            .bind(p.website)
            .bind(user_id)
            .execute(&state.pool)
            .await
        }
        PartyType::Influencer => {
            sqlx::query(
                r#"UPDATE influencers
                   SET name = COALESCE($1, name),
                       category = COALESCE($2, category),
                       platform = COALESCE($3, platform),
                       followers = COALESCE($4, followers),
                       bio = COALESCE($5, bio),
                       image_url = COALESCE($6, image_url),
                       post_price = COALESCE($7, post_price),
                       story_price = COALESCE($8, story_price),
                       reel_price = COALESCE($9, reel_price)
                   WHERE user_id = $10"#,
            )
            .bind(p.name)
            .bind(p.category)
            .bind(p.platform)
            .bind(p.followers)
            .bind(p.bio)
            .bind(p.image_url)
            .bind(p.post_price)
            .bind(p.story_price)
            .bind(p.reel_price)
            .bind(user_id)
            .execute(&state.pool)
            .await
        }
    };

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({"ok": true})),
        Err(e) => {
            eprintln!("update_profile db error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
