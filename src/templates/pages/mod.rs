pub mod login;
pub mod map;

pub use login::login_page;
pub use map::{map_page, GroupFeed, MapPageVm};
