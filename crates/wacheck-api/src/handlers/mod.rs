pub mod carrier;
pub mod check;
pub mod export;
pub mod files;
pub mod health;
pub mod image_proxy;
pub mod lists;
pub mod session;
