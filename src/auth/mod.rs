//! Authentication and authorization

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{Claims, TokenService, TOKEN_TTL_HOURS};
pub use middleware::{authenticate, require_admin, require_auth, Identity};
pub use models::{hash_password, User, UserRole};
