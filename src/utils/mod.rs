mod identity;
mod time;

pub use identity::{IdentitySource, SequentialIdentitySource};
pub use time::{Clock, ManualClock, SystemClock, current_time_millis};
