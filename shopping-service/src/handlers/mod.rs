pub mod captions;
pub mod health;
pub mod metrics;
pub mod session;

pub use captions::get_captions;
pub use health::health_check;
pub use metrics::metrics;
pub use session::{delete_session, get_status, start_session, submit_answer};
