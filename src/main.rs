// src/main.rs
use actix::Actor;
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use dotenvy::dotenv;
use sqlx::PgPool;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use collabzz::{AppState, api, cart::CartStore, docs, ws};

async fn index() -> impl Responder {
    HttpResponse::Ok().body("Collabzz ready!")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let cart_path = env::var("CART_STORE_PATH").unwrap_or_else(|_| "carts.json".to_string());
    let carts = CartStore::load(&cart_path);

    let ws_hub = ws::InboxHub::new().start();

    let state = web::Data::new(AppState {
        pool,
        ws_hub,
        carts,
    });

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(index))
            .service(
                SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
            )
            // public routes
            .service(api::auth::register)
            .service(api::auth::login)
            .service(api::influencers::list_influencers)
            .service(api::influencers::get_influencer)
            .route("/ws/inbox", web::get().to(ws::inbox_ws))
            // routes behind JWT auth
            .service(
                web::scope("/api")
                    .wrap(api::auth::JwtMiddleware)
                    .service(api::influencers::update_profile)
                    .service(api::cart::get_cart)
                    .service(api::cart::add_item)
                    .service(api::cart::update_item)
                    .service(api::cart::remove_item)
                    .service(api::cart::clear_cart)
                    .service(api::checkout::checkout)
                    .service(api::conversations::list_conversations)
                    .service(api::conversations::list_messages)
                    .service(api::conversations::send_message)
                    .service(api::admin::stats)
                    .service(api::admin::list_collaborations)
                    .service(api::admin::set_collaboration_status),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
