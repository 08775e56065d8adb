pub mod capture;
pub mod projection;
pub mod review;
pub mod transition;
