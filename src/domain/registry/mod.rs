//! Registry domain - the resource hierarchy served under `/api/v1/orgs`.
//!
//! ```text
//! Organization ─┬─ Member
//!               └─ Cluster ─┬─ Member
//!                           └─ Bundle ── BundleVersion
//! ```
//!
//! Nothing here performs authorization. Which user may touch which resource
//! is not modelled; any logged-in user can reach every record.

mod errors;
mod member;
mod records;
mod version;

pub use errors::RegistryError;
pub use member::{Member, MemberRole};
pub use records::{validate_name, Bundle, Cluster, Organization};
pub use version::{BundleVersion, UploadStatus};
