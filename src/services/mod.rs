pub mod broadcast;
pub mod clock;
pub mod countdown;
pub mod gateway;
pub mod store;
pub mod viewer;
