pub mod factory;
pub mod memory;
pub mod payments;
pub mod providers;
pub mod repositories;
pub mod storage;
