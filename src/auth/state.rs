//! Authentication state trait and macro.

use crate::jwt::JwtConfig;

/// Trait for router state types the auth gate can verify tokens with.
/// The gate needs only the codec; it never touches storage.
pub trait HasAuthState {
    fn jwt(&self) -> &JwtConfig;
}

/// Macro to implement `HasAuthState` for state structs with a
/// `jwt: Arc<JwtConfig>` field.
#[macro_export]
macro_rules! impl_has_auth_state {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthState for $state_type {
            fn jwt(&self) -> &$crate::jwt::JwtConfig {
                &self.jwt
            }
        }
    };
}
