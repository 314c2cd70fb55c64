//! Entity structs mirroring the Legally REST payloads.
//!
//! All structs derive `Serialize` and `Deserialize` and tolerate the optional
//! fields the server leaves out while a record is still being processed.

mod analysis;
mod contract;
mod user;

pub use analysis::{Analysis, AnalysisEvent, AnalysisRequest, Feedback};
pub use contract::{Contract, ContractPage, UploadReceipt};
pub use user::{AuthResponse, Credentials, UserProfile};
