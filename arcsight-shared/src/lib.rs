pub mod alert;
pub mod api;
pub mod banner;
pub mod domain;
pub mod schedule;

pub use alert::AlertState;
pub use domain::{EventKey, EventRecord};
pub use schedule::{Evaluation, TimeOfDay, TimeWindow, evaluate};
