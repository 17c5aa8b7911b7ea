pub mod job;
pub mod store;
pub mod subsystems;

#[cfg(test)]
mod testing;
