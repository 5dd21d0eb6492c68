pub mod model;
pub mod service;

pub use model::{Feedback, FeedbackRequest, FeedbackResponse};
pub use service::FeedbackService;
