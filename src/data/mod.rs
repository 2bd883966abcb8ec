pub mod loader;
pub mod records;

pub use loader::*;
pub use records::*;
