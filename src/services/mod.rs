pub mod credentials;
pub mod duration;
