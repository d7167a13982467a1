//! Calendar-day arithmetic over revisions: day keys, the per-day index,
//! status classification and date selectability.

mod day_key;
mod gate;
mod index;
mod status;

pub use day_key::*;
pub use gate::*;
pub use index::*;
pub use status::*;
