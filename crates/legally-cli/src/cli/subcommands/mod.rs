mod analysis;
mod auth;
mod contract;

pub use analysis::*;
pub use auth::*;
pub use contract::*;
