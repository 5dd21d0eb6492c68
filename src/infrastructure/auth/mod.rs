pub mod middleware;
pub mod request_id;
pub mod session_cookie;

pub use middleware::{session_middleware, AuthUser};
pub use request_id::{request_id_middleware, RequestId};
pub use session_cookie::{SessionCookies, SESSION_COOKIE};
