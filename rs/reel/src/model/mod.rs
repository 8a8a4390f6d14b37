mod chunk;
mod timestamp;
mod track;

pub use chunk::*;
pub use timestamp::*;
pub use track::*;
