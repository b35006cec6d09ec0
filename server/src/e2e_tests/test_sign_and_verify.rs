//! Test signing with the configured private key and verifying with the public key.

use jsonwebtoken::{Header, encode, get_current_timestamp};

use crate::auth::{JwtError, issue_token, verify_api_server_token, verify_own_token, verify_token};
use crate::configuration::JWT_ALGORITHM;
use crate::e2e_tests::helpers::ResourceDirectory;
use crate::keys::PrivateKey;
use crate::testing::{API_SERVER_PUBLIC_KEY_DER, SIGNING_PRIVATE_KEY_DER, SIGNING_PUBLIC_KEY_DER};

#[test]
fn test_token_round_trip_with_configured_key_names() {
    let resources = ResourceDirectory::empty();
    resources.write("keys/keyshare.sk.der", SIGNING_PRIVATE_KEY_DER);
    resources.write("keys/keyshare.pk.der", SIGNING_PUBLIC_KEY_DER);
    resources.write("keys/api.der", API_SERVER_PUBLIC_KEY_DER);
    resources.write_config(
        r#"{
            "server_name": "AcmeCloud",
            "jwt_privatekey": "keys/keyshare.sk.der",
            "jwt_publickey": "keys/keyshare.pk.der",
            "apiserver_publickey": "keys/api.der",
            "pinExpiry": 120
        }"#,
    );
    let configuration = resources.provider.get_instance();

    let token = issue_token(&configuration, "alice").expect("issued token");
    let claims = verify_own_token(&configuration, &token).expect("verified token");

    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.iss.as_deref(), Some("AcmeCloud"));
    assert_eq!(claims.exp - claims.iat.expect("iat is set"), 120);

    let public = configuration.signing_public_key().expect("valid key");
    assert_eq!(verify_token(&token, public).expect("verified token"), claims);
}

#[test]
fn test_token_from_other_key_rejected() {
    let resources = ResourceDirectory::with_keys();
    let configuration = resources.provider.get_instance();
    let token = issue_token(&configuration, "alice").expect("issued token");

    assert!(matches!(
        verify_api_server_token(&configuration, &token),
        Err(JwtError::InvalidSignature)
    ));
}

#[test]
fn test_peer_token_with_minimal_claims_accepted() {
    let resources = ResourceDirectory::with_keys();
    // The API server's trust anchor is the signing key pair here.
    resources.write("apiserver.der", SIGNING_PUBLIC_KEY_DER);
    let configuration = resources.provider.get_instance();

    let key = PrivateKey::from_pkcs8_der(SIGNING_PRIVATE_KEY_DER).expect("valid key");
    let payload = serde_json::json!({
        "sub": "bob",
        "exp": get_current_timestamp() + 60,
    });
    let token = encode(&Header::new(JWT_ALGORITHM), &payload, key.encoding_key())
        .expect("failed to create test token");

    let claims = verify_api_server_token(&configuration, &token).expect("verified token");
    assert_eq!(claims.sub, "bob");
    assert!(claims.iss.is_none());
}

#[test]
fn test_issue_token_with_broken_key() {
    let resources = ResourceDirectory::with_keys();
    resources.write("sk.der", b"this is not a key");
    let configuration = resources.provider.get_instance();

    assert!(matches!(
        issue_token(&configuration, "alice"),
        Err(JwtError::KeyMaterial(_))
    ));
}
