pub mod activity;
pub mod enrollment;
pub mod export;
pub mod hash;
pub mod jwt;
pub mod performance;
pub mod semester;
pub mod sessions;
