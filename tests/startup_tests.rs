//! Tests for fail-fast secret validation.

use tradepost::jwt::{JwtConfig, JwtError};
use tradepost::secrets::{ACCESS_TOKEN_SECRET_VAR, Secrets, SecretsError};

#[test]
fn test_missing_secret_blocks_startup() {
    let err = Secrets::validate(None).unwrap_err();
    let SecretsError::Missing(names) = err;
    assert_eq!(names, vec![ACCESS_TOKEN_SECRET_VAR]);
}

#[test]
fn test_error_names_the_missing_secret() {
    let err = Secrets::validate(Some(String::new())).unwrap_err();
    assert!(err.to_string().contains(ACCESS_TOKEN_SECRET_VAR));
}

#[test]
fn test_codec_refuses_empty_secret() {
    // Defense in depth behind the startup validator: the codec can never
    // be constructed around an undefined key.
    assert!(matches!(JwtConfig::new(b""), Err(JwtError::EmptySecret)));
}

#[test]
fn test_validated_secrets_build_a_working_codec() {
    let secrets = Secrets::validate(Some("a-secret-that-is-long-enough-to-pass".into())).unwrap();
    let jwt = JwtConfig::new(secrets.access()).unwrap();

    let minted = jwt.mint_access_token("uuid-123").unwrap();
    let claims = jwt.verify_access_token(&minted.token).unwrap();
    assert_eq!(claims.sub, "uuid-123");
}
