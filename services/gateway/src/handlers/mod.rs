pub mod listings;
pub mod sync;
