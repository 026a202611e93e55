pub mod canonical;
pub mod cli;
pub mod co2;
pub mod config;
pub mod csv_out;
pub mod error;
pub mod extract;
pub mod offer;
pub mod pipeline;
pub mod reference;
pub mod segment;
pub mod sink;
pub mod text;

pub use error::{PipeError, Result};
