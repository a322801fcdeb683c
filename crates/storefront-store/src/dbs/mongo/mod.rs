mod convert;
mod client;

pub use client::MongoTableStore;
