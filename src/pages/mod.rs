pub mod explorer;
pub mod home;
pub mod not_found;
