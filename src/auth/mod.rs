mod crypto;
mod extractor;
mod token;

pub use crypto::{hash_password, verify_password};
pub use extractor::{AuthError, AuthUser};
pub use token::{create_access_token, decode_user_id, TOKEN_LIFETIME_HOURS};
