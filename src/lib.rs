pub mod backend;
pub mod engine;
pub mod error;
pub mod output;
pub mod state;
