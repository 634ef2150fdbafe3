pub mod poller;
pub mod view;

pub use poller::{Dashboard, MountError, Notification, PollerHandle, PollerState};
pub use view::{BadgeColor, JobCard};
