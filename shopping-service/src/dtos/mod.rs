pub mod session;

pub use session::{
    AnswerRequest, AnswerResponse, CaptionsResponse, CompletionResponse, ProgressResponse,
    SessionStatusResponse, StartRequest, StartResponse,
};
