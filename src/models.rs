// src/models.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which side of a collaboration a user is on. Brands buy, influencers sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PartyType {
    Brand,
    Influencer,
}

impl PartyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyType::Brand => "brand",
            PartyType::Influencer => "influencer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "brand" => Some(PartyType::Brand),
            "influencer" => Some(PartyType::Influencer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Brand {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub website: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Influencer {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub category: String,
    pub platform: String,
    pub followers: i32,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub post_price: Decimal,
    pub story_price: Decimal,
    pub reel_price: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}

impl Influencer {
    /// Price of one package unit by its label, None for an unknown label.
    pub fn package_price(&self, package: &str) -> Option<Decimal> {
        match package {
            "post" => Some(self.post_price),
            "story" => Some(self.story_price),
            "reel" => Some(self.reel_price),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Collaboration {
    pub id: i32,
    pub brand_id: i32,
    pub brand_name: String,
    pub brand_email: String,
    pub influencer_id: i32,
    pub influencer_name: String,
    pub influencer_email: String,
    pub package_label: String,
    pub amount: Decimal,
    pub status: String, // pending | accepted | completed | cancelled
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub id: i32,
    pub brand_id: i32,
    pub influencer_id: i32,
    pub brand_name: String,
    pub influencer_name: String,
    /// Most recent collaboration that touched this thread.
    pub collaboration_id: Option<i32>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_message_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: i32,
    pub conversation_id: i32,
    pub sender_id: i32,
    pub sender_name: String,
    pub sender_type: String, // brand | influencer | system
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// One pending package selection in a buyer's cart. Never persisted to the
/// database; lives in the cart store only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartEntry {
    pub local_id: String,
    pub influencer_id: i32,
    pub influencer_name: String,
    pub influencer_image: Option<String>,
    pub package: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}
