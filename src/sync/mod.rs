pub mod capture;
pub mod commands;
pub mod local;
pub mod store;
pub mod switch;
#[cfg(test)]
pub(crate) mod testing;
pub mod wire;
