// src/db.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use crate::models::{Brand, ChatMessage, Collaboration, Conversation, Influencer, PartyType};

fn map_influencer(r: &sqlx::postgres::PgRow) -> Influencer {
    Influencer {
        user_id: r.get("user_id"),
        name: r.get("name"),
        email: r.get("email"),
        category: r.get("category"),
        platform: r.get("platform"),
        followers: r.get("followers"),
        bio: r.get("bio"),
        image_url: r.get("image_url"),
        post_price: r.get("post_price"),
        story_price: r.get("story_price"),
        reel_price: r.get("reel_price"),
        created_at: r.get("created_at"),
    }
}

fn map_conversation(r: &sqlx::postgres::PgRow) -> Conversation {
    Conversation {
        id: r.get("id"),
        brand_id: r.get("brand_id"),
        influencer_id: r.get("influencer_id"),
        brand_name: r.get("brand_name"),
        influencer_name: r.get("influencer_name"),
        collaboration_id: r.get("collaboration_id"),
        last_message: r.get("last_message"),
        last_message_at: r.get("last_message_at"),
        last_message_by: r.get("last_message_by"),
        created_at: r.get("created_at"),
    }
}

fn map_message(r: &sqlx::postgres::PgRow) -> ChatMessage {
    ChatMessage {
        id: r.get("id"),
        conversation_id: r.get("conversation_id"),
        sender_id: r.get("sender_id"),
        sender_name: r.get("sender_name"),
        sender_type: r.get("sender_type"),
        body: r.get("body"),
        read: r.get("read"),
        created_at: r.get("created_at"),
    }
}

fn map_collaboration(r: &sqlx::postgres::PgRow) -> Collaboration {
    Collaboration {
        id: r.get("id"),
        brand_id: r.get("brand_id"),
        brand_name: r.get("brand_name"),
        brand_email: r.get("brand_email"),
        influencer_id: r.get("influencer_id"),
        influencer_name: r.get("influencer_name"),
        influencer_email: r.get("influencer_email"),
        package_label: r.get("package_label"),
        amount: r.get("amount"),
        status: r.get("status"),
        description: r.get("description"),
        created_at: r.get("created_at"),
    }
}

pub async fn party_type_of(pool: &PgPool, user_id: i32) -> Result<Option<PartyType>, sqlx::Error> {
    let row = sqlx::query("SELECT party_type FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.and_then(|r| PartyType::from_str(&r.get::<String, _>("party_type"))))
}

pub async fn is_admin(pool: &PgPool, user_id: i32) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT is_admin FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.get("is_admin")).unwrap_or(false))
}

pub async fn get_brand(pool: &PgPool, user_id: i32) -> Result<Option<Brand>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT user_id, name, email, company, website, created_at
           FROM brands
           WHERE user_id = $1"#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| Brand {
        user_id: r.get("user_id"),
        name: r.get("name"),
        email: r.get("email"),
        company: r.get("company"),
        website: r.get("website"),
        created_at: r.get("created_at"),
    }))
}

pub async fn get_influencer(pool: &PgPool, user_id: i32) -> Result<Option<Influencer>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT user_id, name, email, category, platform, followers, bio, image_url,
                  post_price, story_price, reel_price, created_at
           FROM influencers
           WHERE user_id = $1"#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| map_influencer(&r)))
}

#[derive(Debug, Default)]
pub struct InfluencerFilter {
    pub category: Option<String>,
    pub platform: Option<String>,
    pub search: Option<String>,
    pub max_price: Option<Decimal>,
}

pub async fn list_influencers(
    pool: &PgPool,
    filter: &InfluencerFilter,
) -> Result<Vec<Influencer>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT user_id, name, email, category, platform, followers, bio, image_url,
                  post_price, story_price, reel_price, created_at
           FROM influencers
           WHERE ($1::text IS NULL OR category = $1)
             AND ($2::text IS NULL OR platform = $2)
             AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%')
             AND ($4::numeric IS NULL OR post_price <= $4)
           ORDER BY followers DESC"#,
    )
    .bind(filter.category.as_deref())
    .bind(filter.platform.as_deref())
    .bind(filter.search.as_deref())
    .bind(filter.max_price)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_influencer).collect())
}

pub struct NewCollaboration<'a> {
    pub brand: &'a Brand,
    pub influencer: &'a Influencer,
    pub package_label: &'a str,
    pub amount: Decimal,
    pub description: &'a str,
}

pub async fn create_collaboration(
    pool: &PgPool,
    new: &NewCollaboration<'_>,
) -> Result<i32, sqlx::Error> {
    let row = sqlx::query(
        r#"INSERT INTO collaborations
               (brand_id, brand_name, brand_email,
                influencer_id, influencer_name, influencer_email,
                package_label, amount, status, description)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9)
           RETURNING id"#,
    )
    .bind(new.brand.user_id)
    .bind(&new.brand.name)
    .bind(&new.brand.email)
    .bind(new.influencer.user_id)
    .bind(&new.influencer.name)
    .bind(&new.influencer.email)
    .bind(new.package_label)
    .bind(new.amount)
    .bind(new.description)
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

pub async fn find_conversation(
    pool: &PgPool,
    brand_id: i32,
    influencer_id: i32,
) -> Result<Option<Conversation>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT id, brand_id, influencer_id, brand_name, influencer_name,
                  collaboration_id, last_message, last_message_at, last_message_by, created_at
           FROM conversations
           WHERE brand_id = $1 AND influencer_id = $2"#,
    )
    .bind(brand_id)
    .bind(influencer_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| map_conversation(&r)))
}

pub async fn get_conversation(
    pool: &PgPool,
    conversation_id: i32,
) -> Result<Option<Conversation>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT id, brand_id, influencer_id, brand_name, influencer_name,
                  collaboration_id, last_message, last_message_at, last_message_by, created_at
           FROM conversations
           WHERE id = $1"#,
    )
    .bind(conversation_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| map_conversation(&r)))
}

/// Conflict-tolerant insert against UNIQUE(brand_id, influencer_id).
/// Returns None when a concurrent writer created the thread first.
pub async fn create_conversation(
    pool: &PgPool,
    brand: &Brand,
    influencer: &Influencer,
    collaboration_id: i32,
    seed_message: &str,
) -> Result<Option<i32>, sqlx::Error> {
    let row = sqlx::query(
        r#"INSERT INTO conversations
               (brand_id, influencer_id, brand_name, influencer_name,
                collaboration_id, last_message, last_message_at, last_message_by)
           VALUES ($1, $2, $3, $4, $5, $6, NOW(), $1)
           ON CONFLICT (brand_id, influencer_id) DO NOTHING
           RETURNING id"#,
    )
    .bind(brand.user_id)
    .bind(influencer.user_id)
    .bind(&brand.name)
    .bind(&influencer.name)
    .bind(collaboration_id)
    .bind(seed_message)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.get("id")))
}

/// Re-stamps an existing thread with the collaboration that last touched it.
pub async fn stamp_collaboration(
    pool: &PgPool,
    conversation_id: i32,
    collaboration_id: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE conversations SET collaboration_id = $1 WHERE id = $2")
        .bind(collaboration_id)
        .bind(conversation_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn list_conversations_for(
    pool: &PgPool,
    party: PartyType,
    user_id: i32,
) -> Result<Vec<Conversation>, sqlx::Error> {
    let sql = match party {
        PartyType::Brand => {
            r#"SELECT id, brand_id, influencer_id, brand_name, influencer_name,
                      collaboration_id, last_message, last_message_at, last_message_by, created_at
               FROM conversations
               WHERE brand_id = $1"#
        }
        PartyType::Influencer => {
            r#"SELECT id, brand_id, influencer_id, brand_name, influencer_name,
                      collaboration_id, last_message, last_message_at, last_message_by, created_at
               FROM conversations
               WHERE influencer_id = $1"#
        }
    };

    let rows = sqlx::query(sql).bind(user_id).fetch_all(pool).await?;
    Ok(rows.iter().map(map_conversation).collect())
}

pub async fn insert_message(
    pool: &PgPool,
    conversation_id: i32,
    sender_id: i32,
    sender_name: &str,
    sender_type: &str,
    body: &str,
) -> Result<ChatMessage, sqlx::Error> {
    let row = sqlx::query(
        r#"INSERT INTO messages (conversation_id, sender_id, sender_name, sender_type, body, read)
           VALUES ($1, $2, $3, $4, $5, false)
           RETURNING id, conversation_id, sender_id, sender_name, sender_type, body, read, created_at"#,
    )
    .bind(conversation_id)
    .bind(sender_id)
    .bind(sender_name)
    .bind(sender_type)
    .bind(body)
    .fetch_one(pool)
    .await?;

    Ok(map_message(&row))
}

pub async fn list_messages(
    pool: &PgPool,
    conversation_id: i32,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT id, conversation_id, sender_id, sender_name, sender_type, body, read, created_at
           FROM messages
           WHERE conversation_id = $1
           ORDER BY created_at ASC, id ASC"#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_message).collect())
}

pub async fn mark_messages_read(pool: &PgPool, message_ids: &[i32]) -> Result<u64, sqlx::Error> {
    if message_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query("UPDATE messages SET read = true WHERE id = ANY($1)")
        .bind(message_ids)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Denormalized preview on the parent thread. Written separately from the
/// message row itself; a crash in between leaves the preview stale, not
/// the feed corrupt.
pub async fn touch_conversation_preview(
    pool: &PgPool,
    conversation_id: i32,
    last_message: &str,
    last_message_at: DateTime<Utc>,
    last_message_by: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"UPDATE conversations
           SET last_message = $1, last_message_at = $2, last_message_by = $3
           WHERE id = $4"#,
    )
    .bind(last_message)
    .bind(last_message_at)
    .bind(last_message_by)
    .bind(conversation_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_collaborations(pool: &PgPool) -> Result<Vec<Collaboration>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT id, brand_id, brand_name, brand_email,
                  influencer_id, influencer_name, influencer_email,
                  package_label, amount, status, description, created_at
           FROM collaborations
           ORDER BY created_at DESC"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_collaboration).collect())
}

pub async fn set_collaboration_status(
    pool: &PgPool,
    collaboration_id: i32,
    status: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE collaborations SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(collaboration_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub struct PlatformStats {
    pub brands: i64,
    pub influencers: i64,
    pub collaborations: i64,
    pub conversations: i64,
}

pub async fn platform_stats(pool: &PgPool) -> Result<PlatformStats, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT
               (SELECT COUNT(*) FROM brands) AS brands,
               (SELECT COUNT(*) FROM influencers) AS influencers,
               (SELECT COUNT(*) FROM collaborations) AS collaborations,
               (SELECT COUNT(*) FROM conversations) AS conversations"#,
    )
    .fetch_one(pool)
    .await?;

    Ok(PlatformStats {
        brands: row.get("brands"),
        influencers: row.get("influencers"),
        collaborations: row.get("collaborations"),
        conversations: row.get("conversations"),
    })
}
