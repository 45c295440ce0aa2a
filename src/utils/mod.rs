pub mod time;
pub mod user_id;
