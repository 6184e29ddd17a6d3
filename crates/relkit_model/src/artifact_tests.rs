use super::*;

#[test]
fn test_file_name_and_extension() {
    let artifact = Artifact::new("build/dist/app-1.0.0-linux.tar.gz");

    assert_eq!(artifact.file_name(), "app-1.0.0-linux.tar.gz");
    assert_eq!(artifact.extension(), ".tar.gz");
    assert_eq!(artifact.name(), "app-1.0.0-linux");
}

#[test]
fn test_simple_and_missing_extensions() {
    assert_eq!(Artifact::new("app.zip").extension(), ".zip");
    assert_eq!(Artifact::new("bin/app").extension(), "");
    assert_eq!(Artifact::new("bin/app").name(), "app");
    assert_eq!(Artifact::new(".hidden").extension(), "");
    assert_eq!(Artifact::new(r"out\app.msi").file_name(), "app.msi");
}

#[test]
fn test_windows_compatibility() {
    let mut artifact = Artifact::new("app.zip");
    assert!(artifact.is_windows_compatible());

    artifact.set_platform("windows-x86_64").unwrap();
    assert!(artifact.is_windows_compatible());

    artifact.set_platform("osx-aarch_64").unwrap();
    assert!(!artifact.is_windows_compatible());
}

#[test]
fn test_props() {
    let mut artifact = Artifact::new("out/app-1.0.0.zip");
    artifact.set_platform("linux-x86_64").unwrap();
    artifact
        .add_extra_property("checksum", Value::String("abc".into()))
        .unwrap();

    let props = artifact.props();

    assert_eq!(props["artifactPath"], "out/app-1.0.0.zip");
    assert_eq!(props["artifactFileName"], "app-1.0.0.zip");
    assert_eq!(props["artifactName"], "app-1.0.0");
    assert_eq!(props["artifactExtension"], ".zip");
    assert_eq!(props["artifactPlatform"], "linux-x86_64");
    assert_eq!(props["artifactChecksum"], "abc");
}

#[test]
fn test_merge_artifacts_by_path() {
    let mut existing = vec![Artifact::new("a.zip"), Artifact::new("b.zip")];
    let mut updated = Artifact::new("b.zip");
    updated.set_platform("windows").unwrap();
    let incoming = vec![updated, Artifact::new("c.zip")];

    merge_artifacts(&mut existing, &incoming).unwrap();

    let paths: Vec<&str> = existing.iter().map(Artifact::path).collect();
    assert_eq!(paths, vec!["a.zip", "b.zip", "c.zip"]);
    assert_eq!(existing[1].platform(), Some("windows"));
}
