pub mod helpers;
pub mod postgres;
