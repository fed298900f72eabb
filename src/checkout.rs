// src/checkout.rs
//
// Turns a brand's cart into durable collaboration and conversation
// records. Sequential and deliberately non-transactional across entries:
// a missing influencer skips its entry, an unexpected write error aborts
// the rest and leaves already-written records in place.

use actix::Addr;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::db::{self, NewCollaboration};
use crate::models::{Brand, CartEntry};
use crate::ws::{self, InboxHub};

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct CheckoutReport {
    pub collaborations_created: usize,
    pub conversations_created: usize,
    pub entries_skipped: usize,
}

pub async fn run_checkout(
    pool: &PgPool,
    hub: &Addr<InboxHub>,
    brand: &Brand,
    entries: &[CartEntry],
) -> Result<CheckoutReport, sqlx::Error> {
    let mut report = CheckoutReport::default();

    for entry in entries {
        let influencer = match db::get_influencer(pool, entry.influencer_id).await? {
            Some(i) => i,
            None => {
                log::warn!(
                    "checkout: influencer {} not found, skipping cart entry {}",
                    entry.influencer_id,
                    entry.local_id
                );
                report.entries_skipped += 1;
                continue;
            }
        };

        for _ in 0..entry.quantity {
            let description = format!("{} package with {}", entry.package, influencer.name);
            let collaboration_id = db::create_collaboration(
                pool,
                &NewCollaboration {
                    brand,
                    influencer: &influencer,
                    package_label: &entry.package,
                    amount: entry.unit_price,
                    description: &description,
                },
            )
            .await?;
            report.collaborations_created += 1;

            let conversation_id =
                match db::find_conversation(pool, brand.user_id, influencer.user_id).await? {
                    Some(conversation) => {
                        db::stamp_collaboration(pool, conversation.id, collaboration_id).await?;
                        conversation.id
                    }
                    None => {
                        let seed = format!(
                            "New collaboration started: {} package with {}",
                            entry.package, influencer.name
                        );
                        match db::create_conversation(
                            pool,
                            brand,
                            &influencer,
                            collaboration_id,
                            &seed,
                        )
                        .await?
                        {
                            Some(id) => {
                                db::insert_message(
                                    pool,
                                    id,
                                    brand.user_id,
                                    "Collabzz",
                                    "system",
                                    &seed,
                                )
                                .await?;
                                report.conversations_created += 1;
                                id
                            }
                            // lost the unique-index race; the winner's thread is ours too
                            None => {
                                match db::find_conversation(pool, brand.user_id, influencer.user_id)
                                    .await?
                                {
                                    Some(conversation) => conversation.id,
                                    None => {
                                        log::warn!(
                                            "checkout: conversation for brand {} / influencer {} vanished after conflict",
                                            brand.user_id,
                                            influencer.user_id
                                        );
                                        continue;
                                    }
                                }
                            }
                        }
                    }
                };

            if let Some(conversation) = db::get_conversation(pool, conversation_id).await? {
                ws::notify_conversation(hub, &conversation);
            }
        }
    }

    Ok(report)
}
