pub mod account;
pub mod deal;
pub mod message;
pub mod period;
pub mod result;
