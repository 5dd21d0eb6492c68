pub mod catalog;
pub mod dispatcher;
pub mod error;

pub use catalog::{options_for, BackendKind, ModelOption, ModelSpec, DEFAULT_MODEL_KEY};
pub use dispatcher::{DispatchRequest, ModelDispatcher, BACKEND_FAILURE_REPLY};
pub use error::DispatchError;
