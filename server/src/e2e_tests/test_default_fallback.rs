//! Test that configuration errors fail open while key errors fail closed.

use crate::configuration::Settings;
use crate::e2e_tests::helpers::ResourceDirectory;
use crate::keys::KeyMaterialError;

#[test]
fn test_missing_config_file() {
    let resources = ResourceDirectory::empty();
    let configuration = resources.provider.get_instance();

    assert_eq!(configuration.settings(), &Settings::default());
}

#[test]
fn test_unparsable_config_file() {
    let resources = ResourceDirectory::with_keys();
    resources.write_config("{ \"server_name\": \"AcmeCloud\", ");

    let configuration = resources.provider.get_instance();

    assert_eq!(configuration.settings(), &Settings::default());
    // Defaults still point at the default key names, which exist here.
    assert!(configuration.signing_private_key().is_ok());
}

#[test]
fn test_defaults_without_keys_fail_closed() {
    let resources = ResourceDirectory::empty();
    let configuration = resources.provider.get_instance();

    assert!(matches!(
        configuration.signing_private_key(),
        Err(KeyMaterialError::NotFound { .. })
    ));
    assert!(matches!(
        configuration.signing_public_key(),
        Err(KeyMaterialError::NotFound { .. })
    ));
    assert!(matches!(
        configuration.api_server_public_key(),
        Err(KeyMaterialError::NotFound { .. })
    ));
}

#[test]
fn test_empty_key_file_fails_closed() {
    let resources = ResourceDirectory::empty();
    resources.write("sk.der", &[]);

    let configuration = resources.provider.get_instance();

    assert!(matches!(
        configuration.signing_private_key(),
        Err(KeyMaterialError::MalformedKey { .. })
    ));
}

#[test]
fn test_key_path_is_directory() {
    let resources = ResourceDirectory::empty();
    std::fs::create_dir(resources.path().join("pk.der")).expect("create dir");

    let configuration = resources.provider.get_instance();

    assert!(matches!(
        configuration.signing_public_key(),
        Err(KeyMaterialError::ReadFailure { .. })
    ));
}
