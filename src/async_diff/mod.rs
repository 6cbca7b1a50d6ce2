pub mod channel;
pub mod worker;

pub use channel::{DiffRequest, DiffResult};
pub use worker::DiffWorker;
