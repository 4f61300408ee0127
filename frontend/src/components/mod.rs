pub mod admin;
pub mod auth;
pub mod handlers;
pub mod header;
pub mod history;
pub mod preview_area;
pub mod profile;
pub mod results;
pub mod upload_section;
pub mod utils;
