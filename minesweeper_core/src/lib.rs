#![allow(async_fn_in_trait)]

pub mod algebra;
pub mod board;
pub mod commands;
pub mod compose;
pub mod error;
pub mod games;
pub mod store;
pub mod types;
