//! Value objects.

mod account_status;
mod content_kind;
mod report;
mod role;

pub use account_status::AccountStatus;
pub use content_kind::ContentKind;
pub use report::{ReportReason, ReportStatus, ReportTargetKind};
pub use role::UserRole;
