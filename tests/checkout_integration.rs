use actix::Actor;
use actix_web::test::TestRequest;
use actix_web::{test, web, App};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use tempfile::tempdir;
use uuid::Uuid;

use collabzz::api;
use collabzz::api::auth::{generate_jwt, JwtMiddleware};
use collabzz::cart::{CartStore, NewCartItem};
use collabzz::checkout::run_checkout;
use collabzz::db;
use collabzz::ws::InboxHub;
use collabzz::AppState;

mod support;

fn ensure_jwt_secret() {
    if std::env::var("JWT_SECRET").is_err() {
        std::env::set_var("JWT_SECRET", "integration-test-secret");
    }
}

fn build_state(pool: PgPool, cart_path: std::path::PathBuf) -> AppState {
    AppState {
        pool,
        ws_hub: InboxHub::new().start(),
        carts: CartStore::load(cart_path),
    }
}

fn cart_item(influencer_id: i32, package: &str, unit_price: i64) -> NewCartItem {
    NewCartItem {
        influencer_id,
        influencer_name: format!("influencer-{influencer_id}"),
        influencer_image: None,
        package: package.to_string(),
        unit_price: Decimal::from(unit_price),
    }
}

async fn create_brand(pool: &PgPool, suffix: &str) -> i32 {
    let email = format!("brand_{suffix}@collabzz.test");
    let user_id: i32 = sqlx::query(
        r#"INSERT INTO users (email, password_hash, party_type)
           VALUES ($1, 'test-hash', 'brand')
           RETURNING id"#,
    )
    .bind(&email)
    .fetch_one(pool)
    .await
    .expect("insert brand user")
    .get("id");

    sqlx::query("INSERT INTO brands (user_id, name, email) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(format!("Brand {suffix}"))
        .bind(&email)
        .execute(pool)
        .await
        .expect("insert brand profile");

    user_id
}

async fn create_influencer(pool: &PgPool, label: &str, post_price: i64) -> i32 {
    let email = format!("influencer_{label}@collabzz.test");
    let user_id: i32 = sqlx::query(
        r#"INSERT INTO users (email, password_hash, party_type)
           VALUES ($1, 'test-hash', 'influencer')
           RETURNING id"#,
    )
    .bind(&email)
    .fetch_one(pool)
    .await
    .expect("insert influencer user")
    .get("id");

    sqlx::query(
        r#"INSERT INTO influencers (user_id, name, email, post_price)
           VALUES ($1, $2, $3, $4)"#,
    )
    .bind(user_id)
    .bind(format!("Influencer {label}"))
    .bind(&email)
    .bind(Decimal::from(post_price))
    .execute(pool)
    .await
    .expect("insert influencer profile");

    user_id
}

async fn insert_conversation(pool: &PgPool, brand_id: i32, influencer_id: i32) -> i32 {
    sqlx::query(
        r#"INSERT INTO conversations (brand_id, influencer_id, brand_name, influencer_name)
           VALUES ($1, $2, 'Brand', 'Influencer')
           RETURNING id"#,
    )
    .bind(brand_id)
    .bind(influencer_id)
    .fetch_one(pool)
    .await
    .expect("insert conversation")
    .get("id")
}

#[actix_web::test]
async fn checkout_creates_collaborations_and_conversations_then_clears_cart() {
    let Some(test_db) = support::try_init_test_db().await else {
        return;
    };
    ensure_jwt_secret();
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().to_string();

    let brand_id = create_brand(pool, &suffix).await;
    let x = create_influencer(pool, &format!("x_{suffix}"), 500).await;
    let y = create_influencer(pool, &format!("y_{suffix}"), 200).await;

    let dir = tempdir().expect("tempdir");
    let state = web::Data::new(build_state(pool.clone(), dir.path().join("carts.json")));

    // two units for X, one for Y
    state.carts.add(brand_id, cart_item(x, "post", 500));
    state.carts.add(brand_id, cart_item(x, "post", 500));
    state.carts.add(brand_id, cart_item(y, "post", 200));

    let app = test::init_service(
        App::new().app_data(state.clone()).service(
            web::scope("/api")
                .wrap(JwtMiddleware)
                .service(api::checkout::checkout),
        ),
    )
    .await;

    let token = generate_jwt(brand_id).expect("jwt");
    let req = TestRequest::post()
        .uri("/api/checkout")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let report: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(report["collaborations_created"], 3);
    assert_eq!(report["conversations_created"], 2);
    assert_eq!(report["entries_skipped"], 0);

    let amounts: Vec<Decimal> = sqlx::query(
        r#"SELECT amount FROM collaborations WHERE brand_id = $1 ORDER BY amount DESC"#,
    )
    .bind(brand_id)
    .fetch_all(pool)
    .await
    .expect("select collaborations")
    .iter()
    .map(|r| r.get("amount"))
    .collect();
    assert_eq!(
        amounts,
        vec![Decimal::from(500), Decimal::from(500), Decimal::from(200)]
    );

    let conversations: i64 =
        sqlx::query("SELECT COUNT(*) AS n FROM conversations WHERE brand_id = $1")
            .bind(brand_id)
            .fetch_one(pool)
            .await
            .expect("count conversations")
            .get("n");
    assert_eq!(conversations, 2);

    // each new thread starts with its synthetic system message
    let system_messages: i64 = sqlx::query(
        r#"SELECT COUNT(*) AS n
           FROM messages m
           JOIN conversations c ON c.id = m.conversation_id
           WHERE c.brand_id = $1 AND m.sender_type = 'system'"#,
    )
    .bind(brand_id)
    .fetch_one(pool)
    .await
    .expect("count system messages")
    .get("n");
    assert_eq!(system_messages, 2);

    assert!(state.carts.entries(brand_id).is_empty());
}

#[actix_web::test]
async fn checkout_reuses_an_existing_conversation() {
    let Some(test_db) = support::try_init_test_db().await else {
        return;
    };
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().to_string();

    let brand_id = create_brand(pool, &suffix).await;
    let influencer_id = create_influencer(pool, &suffix, 500).await;
    insert_conversation(pool, brand_id, influencer_id).await;

    let brand = db::get_brand(pool, brand_id)
        .await
        .expect("brand lookup")
        .expect("brand exists");

    let dir = tempdir().expect("tempdir");
    let store = CartStore::load(dir.path().join("carts.json"));
    store.add(brand_id, cart_item(influencer_id, "post", 500));
    store.add(brand_id, cart_item(influencer_id, "post", 500));

    let hub = InboxHub::new().start();
    let report = run_checkout(pool, &hub, &brand, &store.entries(brand_id))
        .await
        .expect("checkout");

    assert_eq!(report.collaborations_created, 2);
    assert_eq!(report.conversations_created, 0);

    let conversations: i64 = sqlx::query(
        "SELECT COUNT(*) AS n FROM conversations WHERE brand_id = $1 AND influencer_id = $2",
    )
    .bind(brand_id)
    .bind(influencer_id)
    .fetch_one(pool)
    .await
    .expect("count conversations")
    .get("n");
    assert_eq!(conversations, 1);
}

#[actix_web::test]
async fn checkout_skips_entries_for_missing_influencers() {
    let Some(test_db) = support::try_init_test_db().await else {
        return;
    };
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().to_string();

    let brand_id = create_brand(pool, &suffix).await;
    let brand = db::get_brand(pool, brand_id)
        .await
        .expect("brand lookup")
        .expect("brand exists");

    let dir = tempdir().expect("tempdir");
    let store = CartStore::load(dir.path().join("carts.json"));
    store.add(brand_id, cart_item(999_999_999, "post", 500));

    let hub = InboxHub::new().start();
    let report = run_checkout(pool, &hub, &brand, &store.entries(brand_id))
        .await
        .expect("checkout");

    assert_eq!(report.collaborations_created, 0);
    assert_eq!(report.conversations_created, 0);
    assert_eq!(report.entries_skipped, 1);
}

#[actix_web::test]
async fn opening_a_feed_marks_counterpart_messages_read() {
    let Some(test_db) = support::try_init_test_db().await else {
        return;
    };
    ensure_jwt_secret();
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().to_string();

    let brand_id = create_brand(pool, &suffix).await;
    let influencer_id = create_influencer(pool, &suffix, 500).await;
    let conversation_id = insert_conversation(pool, brand_id, influencer_id).await;

    for i in 0..3 {
        db::insert_message(
            pool,
            conversation_id,
            influencer_id,
            "Influencer",
            "influencer",
            &format!("hello {i}"),
        )
        .await
        .expect("insert counterpart message");
    }
    db::insert_message(pool, conversation_id, brand_id, "Brand", "brand", "hi back")
        .await
        .expect("insert own message");

    let dir = tempdir().expect("tempdir");
    let state = web::Data::new(build_state(pool.clone(), dir.path().join("carts.json")));
    let app = test::init_service(
        App::new().app_data(state.clone()).service(
            web::scope("/api")
                .wrap(JwtMiddleware)
                .service(api::conversations::list_messages),
        ),
    )
    .await;

    let token = generate_jwt(brand_id).expect("jwt");
    let req = TestRequest::get()
        .uri(&format!("/api/conversations/{conversation_id}/messages"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let messages: Vec<serde_json::Value> = test::read_body_json(resp).await;
    assert_eq!(messages.len(), 4);
    for message in &messages {
        if message["sender_id"] == influencer_id {
            assert_eq!(message["read"], true);
        } else {
            // the viewer's own unread message stays untouched
            assert_eq!(message["read"], false);
        }
    }

    let still_unread: i64 = sqlx::query(
        "SELECT COUNT(*) AS n FROM messages WHERE conversation_id = $1 AND read = false",
    )
    .bind(conversation_id)
    .fetch_one(pool)
    .await
    .expect("count unread")
    .get("n");
    assert_eq!(still_unread, 1);
}
