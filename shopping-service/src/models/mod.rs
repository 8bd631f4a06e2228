pub mod session;
pub mod video;

pub use session::{AnswerError, Session, SessionAnswer, Stage};
pub use video::VideoRecommendation;
