use super::*;
use crate::active::Active;
use crate::export::{HIDE, UNSET};
use crate::secrets::MapSecretResolver;
use crate::test_support::model;

#[test]
fn test_mode_parse() {
    assert_eq!(SigningMode::parse("memory").unwrap(), SigningMode::Memory);
    assert_eq!(SigningMode::parse(" Cosign ").unwrap(), SigningMode::Cosign);

    match SigningMode::parse("vault") {
        Err(ConfigurationError::InvalidValue { field, value, .. }) => {
            assert_eq!(field, "mode");
            assert_eq!(value, "vault");
        }
        other => panic!("Expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn test_defaults() {
    let signing = Signing::default();

    assert_eq!(signing.mode(), SigningMode::Memory);
    assert!(signing.is_armored());
    assert!(signing.is_artifacts());
    assert!(signing.is_files());
    assert!(signing.is_checksums());
    assert_eq!(signing.passphrase(), None);
}

#[test]
fn test_disabled_unless_configured() {
    let mut signing = Signing::default();

    let enabled = signing.resolve_enabled(model("1.0.0").project()).unwrap();

    assert!(!enabled);
    assert_eq!(signing.active(), Some(Active::Never));
}

#[test]
fn test_release_policy_skips_snapshots() {
    let mut signing = Signing::default();
    signing.set_active(Active::Release).unwrap();

    assert!(!signing.resolve_enabled(model("1.1.0-SNAPSHOT").project()).unwrap());
    assert!(signing.resolve_enabled(model("1.1.0").project()).unwrap());
}

#[test]
fn test_signature_extension() {
    let mut signing = Signing::default();
    assert_eq!(signing.signature_extension(), ".asc");

    signing.set_armored(false).unwrap();
    assert_eq!(signing.signature_extension(), ".sig");

    signing.set_armored(true).unwrap();
    signing.set_mode(SigningMode::Cosign).unwrap();
    assert_eq!(signing.signature_extension(), ".sig");
}

#[test]
fn test_secrets_from_environment() {
    let mut signing = Signing::default();
    signing.set_passphrase("from-config").unwrap();
    let resolver = MapSecretResolver::new()
        .with("SIGNING_SECRET_KEY", "-----BEGIN PGP-----")
        .with("SIGNING_PASSPHRASE", "from-env");

    signing.resolve_secrets(&resolver).unwrap();

    assert_eq!(signing.secret_key(), Some("-----BEGIN PGP-----"));
    assert_eq!(signing.passphrase(), Some("from-env"));
    assert_eq!(signing.public_key(), None);
    assert_eq!(
        signing.secret_variables(),
        vec!["SIGNING_PUBLIC_KEY", "SIGNING_SECRET_KEY", "SIGNING_PASSPHRASE"]
    );
}

#[test]
fn test_toml_mode_and_merge() {
    let mut base: Signing = toml::from_str("active = \"ALWAYS\"\nmode = \"file\"\narmored = false\n").unwrap();
    let overlay: Signing = toml::from_str("checksums = false\n").unwrap();

    base.merge(&overlay).unwrap();

    assert_eq!(base.active(), Some(Active::Always));
    assert_eq!(base.mode(), SigningMode::File);
    assert!(!base.is_armored());
    assert!(!base.is_checksums());
}

#[test]
fn test_toml_rejects_unknown_mode() {
    let result: Result<Signing, _> = toml::from_str("mode = \"vault\"\n");
    assert!(result.is_err());
}

#[test]
fn test_as_map() {
    let mut signing = Signing::default();
    assert!(signing.as_map(false).is_empty());

    signing.set_active(Active::Always).unwrap();
    signing.set_secret_key("key").unwrap();
    signing.resolve_enabled(model("1.0.0").project()).unwrap();
    let map = signing.as_map(false);

    assert_eq!(map["mode"], "MEMORY");
    assert_eq!(map["active"], "ALWAYS");
    assert_eq!(map["secret_key"], HIDE);
    assert_eq!(map["passphrase"], UNSET);
}
