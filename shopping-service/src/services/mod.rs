pub mod assistant;
pub mod flow;
pub mod metrics;
pub mod outcome;
pub mod prompts;
pub mod providers;
pub mod question_parser;
pub mod session_store;

pub use assistant::{Recommendations, ShoppingAssistant};
pub use flow::{AnswerOutcome, SessionFlowController};
pub use outcome::Outcome;
pub use session_store::{InMemorySessionStore, SessionStore};
