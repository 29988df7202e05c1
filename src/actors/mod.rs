pub mod concierge_actor;
pub mod messages;

pub use concierge_actor::ConciergeHandle;
