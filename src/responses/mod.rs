pub mod cookies;
pub mod errors;
pub mod html;
pub mod json;

pub use cookies::{clear_session_cookie, session_cookie, session_token};
pub use errors::{status_for, ResultResp};
pub use html::{html_response, redirect, redirect_with_cookie};
pub use json::json_response;
