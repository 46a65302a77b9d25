//! Type resolution: from model elements to printable TypeScript types.

pub mod builtins;
pub mod draft;
pub mod entity;
pub mod info;
pub mod inline;
pub mod keys;
pub mod resolver;

pub use builtins::{Builtins, Container};
pub use draft::{collect_draft_enabled, DraftCollection};
pub use entity::{EntityInfo, EntityRepository};
pub use info::{TypeResolveInfo, TypeState, UserDefined};
pub use inline::{inline_resolver, InlineDeclarationResolver, PropertyStyle};
pub use keys::KeyPropagator;
pub use resolver::{Resolved, Resolver, MAX_DEPTH};
