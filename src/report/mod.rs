//! Report generation: the compact block map and the verbose structural
//! dump. Both passes consume the shared classified-block walk and own
//! their output sink exclusively.

pub mod dump;
pub mod map;

pub use dump::write_dump;
pub use map::write_map;
