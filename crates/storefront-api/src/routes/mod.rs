pub mod health;
pub mod products;
pub mod categories;
pub mod recommendations;
pub mod chat;
