pub mod delivery;
pub mod event;
pub mod rider;
