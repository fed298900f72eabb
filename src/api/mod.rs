pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod conversations;
pub mod influencers;
