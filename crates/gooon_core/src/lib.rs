pub mod countdown;
pub mod input;
pub mod layout;
pub mod time;
