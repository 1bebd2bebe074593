mod app;
pub mod cron;
mod error;
pub mod revert;
pub mod types;

pub use app::EVMUploader;
pub use cron::cron as run_cron;
pub use error::UploaderError;
pub use types::{Reward, TxInfo, UploaderState};
