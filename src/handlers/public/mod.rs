// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation and token acquisition. Everything here must validate its
// own input since there is no caller identity yet.

pub mod user;

pub use user::{login_post, register_post};
