pub mod client;

pub use crate::domain::model::{Method, Query, QueryResult, Record};
pub use crate::domain::ports::{ClientContext, ResponseInterpreter, Transport};
pub use crate::utils::error::Result;
pub use client::Client;
