pub mod api;
pub mod cart;
pub mod checkout;
pub mod db;
pub mod docs;
pub mod inbox;
pub mod models;
pub mod ws;

use actix::Addr;
use sqlx::PgPool;

use crate::cart::CartStore;
use crate::ws::InboxHub;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ws_hub: Addr<InboxHub>,
    pub carts: CartStore,
}
