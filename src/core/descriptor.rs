//! Entity descriptors: per-type metadata derived once at registration.
//!
//! A descriptor captures everything the generic handlers need to know about
//! an entity type (collection name, identity field and kind, implemented
//! hooks) so nothing is re-derived per request.

use crate::core::entity::{Entity, EntityId, IdKind};
use crate::core::hooks::{HookSet, Hooks};
use crate::core::pluralize::pluralize;
use std::sync::Arc;

/// Immutable per-entity metadata. Built by [`EntityDescriptor::describe`]
/// exactly once per entity type at registration and shared by every handler
/// of that entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    /// Singular type name, lower-case (e.g. "user").
    pub entity_type: String,
    /// Pluralized, lower-case collection name (e.g. "users"). Determines the
    /// route base path.
    pub collection: String,
    /// Name of the identity field in the serialized representation.
    pub id_field: String,
    /// Declared identity kind.
    pub id_kind: IdKind,
    /// Lifecycle hooks the entity type implements.
    pub hooks: HookSet,
}

impl EntityDescriptor {
    /// Derive the descriptor for an entity type.
    ///
    /// Call once at registration and keep the result; deriving per request
    /// would be wasteful and risks an inconsistent URL surface.
    pub fn describe<E: Entity + Hooks>() -> Arc<EntityDescriptor> {
        let entity_type = E::TYPE_NAME.to_lowercase();
        let collection = pluralize(&entity_type).to_lowercase();
        Arc::new(EntityDescriptor {
            entity_type,
            collection,
            id_field: E::ID_FIELD.to_string(),
            id_kind: <E::Id as EntityId>::KIND,
            hooks: E::capabilities(),
        })
    }

    /// Route base path for this entity ("/" + collection).
    pub fn base_path(&self) -> String {
        format!("/{}", self.collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hooks::Hook;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Company {
        id: u64,
        name: String,
    }

    impl Entity for Company {
        const TYPE_NAME: &'static str = "company";
        type Id = u64;

        fn id(&self) -> Self::Id {
            self.id
        }

        fn set_id(&mut self, id: Self::Id) {
            self.id = id;
        }
    }

    impl Hooks for Company {
        fn capabilities() -> HookSet {
            HookSet::NONE.with(Hook::BeforeCreate)
        }
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Person {
        id: String,
    }

    impl Entity for Person {
        const TYPE_NAME: &'static str = "person";
        type Id = String;

        fn id(&self) -> Self::Id {
            self.id.clone()
        }

        fn set_id(&mut self, id: Self::Id) {
            self.id = id;
        }
    }

    impl Hooks for Person {}

    #[test]
    fn test_describe_pluralizes_collection() {
        let desc = EntityDescriptor::describe::<Company>();
        assert_eq!(desc.entity_type, "company");
        assert_eq!(desc.collection, "companies");
        assert_eq!(desc.base_path(), "/companies");
    }

    #[test]
    fn test_describe_irregular_plural() {
        let desc = EntityDescriptor::describe::<Person>();
        assert_eq!(desc.collection, "people");
    }

    #[test]
    fn test_describe_identity_kind() {
        let company = EntityDescriptor::describe::<Company>();
        assert_eq!(company.id_kind, IdKind::Uint);
        assert_eq!(company.id_field, "id");

        let person = EntityDescriptor::describe::<Person>();
        assert_eq!(person.id_kind, IdKind::Text);
    }

    #[test]
    fn test_describe_snapshots_hooks() {
        let company = EntityDescriptor::describe::<Company>();
        assert!(company.hooks.contains(Hook::BeforeCreate));
        assert!(!company.hooks.contains(Hook::AfterCreate));

        let person = EntityDescriptor::describe::<Person>();
        assert!(person.hooks.is_empty());
    }
}
