pub mod error;
pub mod filters;
pub mod group_detail;

pub use error::html_error_response;
pub use filters::filter_drawer;
pub use group_detail::group_detail;
