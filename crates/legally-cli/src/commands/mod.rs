pub mod analysis;
pub mod auth;
pub mod contract;
pub mod dispatch;
