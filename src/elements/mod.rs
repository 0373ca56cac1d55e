//! Structural elements module

mod material;
mod member;
mod node;
mod section;
mod support;

pub use material::{Material, MaterialKind};
pub use member::{Member, MemberReleases, MemberRole};
pub use node::Node;
pub use section::{Section, SectionShape};
pub use support::Support;
