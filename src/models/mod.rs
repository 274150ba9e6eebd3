pub mod event;
pub mod gift;
pub mod invited;
pub mod user;
