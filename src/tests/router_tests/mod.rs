mod auth_tests;
mod filter_tests;
mod map_tests;
