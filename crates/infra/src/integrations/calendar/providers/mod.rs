//! Calendar providers.

pub mod google;
pub mod traits;

pub use google::GoogleCalendarProvider;
pub use traits::{create_provider, CalendarProviderTrait};
