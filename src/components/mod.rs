pub mod history;
pub mod payment;
pub mod status;
pub mod wallet;
