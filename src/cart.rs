// src/cart.rs
//
// Per-user pending package selections. Carts never touch the database:
// they live in memory and are mirrored to a single JSON file so they
// survive a restart. A malformed or missing file means empty carts.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::Decimal;

use crate::models::CartEntry;

#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub influencer_id: i32,
    pub influencer_name: String,
    pub influencer_image: Option<String>,
    pub package: String,
    pub unit_price: Decimal,
}

#[derive(Clone)]
pub struct CartStore {
    path: PathBuf,
    inner: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    carts: HashMap<i32, Vec<CartEntry>>,
    // monotonic suffix so two adds in the same millisecond get distinct ids
    seq: u64,
}

impl CartStore {
    /// Rehydrates carts from `path`. Anything unreadable or unparsable
    /// degrades to an empty store rather than an error.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let carts = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<i32, Vec<CartEntry>>>(&raw) {
                Ok(carts) => carts,
                Err(e) => {
                    log::warn!("cart store at {} is malformed ({e}), starting empty", path.display());
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        CartStore {
            path,
            inner: Arc::new(Mutex::new(State { carts, seq: 0 })),
        }
    }

    pub fn entries(&self, user_id: i32) -> Vec<CartEntry> {
        self.lock().carts.get(&user_id).cloned().unwrap_or_default()
    }

    /// Adds one unit. An entry with the same (influencer, package) pair is
    /// incremented instead of duplicated.
    pub fn add(&self, user_id: i32, item: NewCartItem) -> Vec<CartEntry> {
        let mut state = self.lock();
        state.seq += 1;
        let local_id = format!("{}-{}", Utc::now().timestamp_millis(), state.seq);

        let entries = state.carts.entry(user_id).or_default();
        match entries
            .iter_mut()
            .find(|e| e.influencer_id == item.influencer_id && e.package == item.package)
        {
            Some(entry) => entry.quantity += 1,
            None => entries.push(CartEntry {
                local_id,
                influencer_id: item.influencer_id,
                influencer_name: item.influencer_name,
                influencer_image: item.influencer_image,
                package: item.package,
                unit_price: item.unit_price,
                quantity: 1,
            }),
        }

        let snapshot = entries.clone();
        self.persist(&state);
        snapshot
    }

    pub fn remove(&self, user_id: i32, local_id: &str) -> Vec<CartEntry> {
        let mut state = self.lock();
        if let Some(entries) = state.carts.get_mut(&user_id) {
            entries.retain(|e| e.local_id != local_id);
        }
        let snapshot = state.carts.get(&user_id).cloned().unwrap_or_default();
        self.persist(&state);
        snapshot
    }

    /// Quantities below 1 remove the entry; anything past `u32::MAX` clamps.
    pub fn update_quantity(&self, user_id: i32, local_id: &str, quantity: i64) -> Vec<CartEntry> {
        if quantity < 1 {
            return self.remove(user_id, local_id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let mut state = self.lock();
        if let Some(entry) = state
            .carts
            .get_mut(&user_id)
            .and_then(|entries| entries.iter_mut().find(|e| e.local_id == local_id))
        {
            entry.quantity = quantity;
        }
        let snapshot = state.carts.get(&user_id).cloned().unwrap_or_default();
        self.persist(&state);
        snapshot
    }

    pub fn clear(&self, user_id: i32) {
        let mut state = self.lock();
        state.carts.remove(&user_id);
        self.persist(&state);
    }

    /// Σ unit_price × quantity, in exact decimal arithmetic.
    pub fn total(&self, user_id: i32) -> Decimal {
        self.lock()
            .carts
            .get(&user_id)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| e.unit_price * Decimal::from(e.quantity))
                    .sum()
            })
            .unwrap_or_default()
    }

    pub fn item_count(&self, user_id: i32) -> u32 {
        self.lock()
            .carts
            .get(&user_id)
            .map(|entries| entries.iter().map(|e| e.quantity).sum())
            .unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.inner.lock() {
            Ok(guard) => guard,
            // a poisoned lock still holds consistent cart data
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // In-memory state stays authoritative if the mirror write fails.
    fn persist(&self, state: &State) {
        match serde_json::to_string(&state.carts) {
            Ok(raw) => {
                if let Err(e) = fs::write(&self.path, raw) {
                    log::error!("cart store write to {} failed: {e}", self.path.display());
                }
            }
            Err(e) => log::error!("cart store serialize failed: {e}"),
        }
    }
}
