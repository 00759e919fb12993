//! Macros for reducing boilerplate when defining entities
//!
//! Every entity carries `id`, `created_at` and `updated_at` fields; these
//! macros generate the repetitive [`Entity`](crate::core::entity::Entity) and
//! [`Owned`](crate::core::entity::Owned) implementations over them.

/// Implement `Entity` (and optionally `Owned`) for a struct
///
/// # Example
/// ```rust,ignore
/// impl_entity!(Tweet, "tweets", "tweet", owned_by owner as "owner");
/// impl_entity!(User, "users", "user");
/// ```
#[macro_export]
macro_rules! impl_entity {
    ($type:ident, $plural:literal, $singular:literal) => {
        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }
        }
    };

    ($type:ident, $plural:literal, $singular:literal, owned_by $field:ident as $wire:literal) => {
        $crate::impl_entity!($type, $plural, $singular);

        impl $crate::core::entity::Owned for $type {
            fn owner_field() -> &'static str {
                $wire
            }

            fn owner_id(&self) -> ::uuid::Uuid {
                self.$field
            }
        }
    };
}
