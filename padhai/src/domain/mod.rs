mod drafts;
mod ids;
mod lenient;
mod revision;
mod score;
mod subject;
mod timestamp;
mod user;

pub use drafts::*;
pub use ids::*;
pub use revision::*;
pub use score::*;
pub use subject::*;
pub use timestamp::*;
pub use user::*;
