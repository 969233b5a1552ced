pub mod console;
pub mod report;
pub mod stream;
