//! Meeting storage adapters

pub mod memory;

pub use memory::InMemoryMeetingStore;
