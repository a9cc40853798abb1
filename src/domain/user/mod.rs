//! User domain
//!
//! Domain types and traits for the user store: user entities, roles,
//! validation, and the repository trait.

mod entity;
mod repository;
mod role;
mod validation;

pub use entity::{User, UserId, UserStatus};
pub use repository::UserRepository;
pub use role::{Role, RoleSet};
pub use validation::{
    validate_email, validate_name, validate_nip, validate_password, validate_user_id,
    UserValidationError,
};

#[cfg(test)]
pub use repository::mock::MockUserRepository;
