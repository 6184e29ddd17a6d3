use super::*;
use crate::test_support::{context, model};

#[test]
fn test_format_parse_accepts_names_and_extensions() {
    assert_eq!(Format::parse("ZIP").unwrap(), Format::Zip);
    assert_eq!(Format::parse("tar_gz").unwrap(), Format::TarGz);
    assert_eq!(Format::parse(".tar.xz").unwrap(), Format::TarXz);
    assert_eq!(Format::parse(" tbz2 ").unwrap(), Format::Tbz2);
}

#[test]
fn test_format_parse_rejects_unknown() {
    let result = Format::parse("rar");

    match result {
        Err(ConfigurationError::InvalidValue { field, value, .. }) => {
            assert_eq!(field, "format");
            assert_eq!(value, "rar");
        }
        other => panic!("Expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn test_format_extension() {
    assert_eq!(Format::Zip.extension(), ".zip");
    assert_eq!(Format::TarZst.extension(), ".tar.zst");
    assert_eq!(Format::Tgz.to_string(), "TGZ");
}

#[test]
fn test_file_set_defaults() {
    let file_set = FileSet::new("target/release");

    assert_eq!(file_set.input(), "target/release");
    assert_eq!(file_set.output(), None);
    assert!(file_set.is_fail_on_missing_input());
}

#[test]
fn test_assembler_defaults() {
    let assembler = ArchiveAssembler::new("app");

    assert_eq!(assembler.archive_name(), DEFAULT_ARCHIVE_NAME);
    assert_eq!(assembler.distribution_type(), DistributionType::Binary);
    assert!(!assembler.is_attach_platform());
    assert_eq!(assembler.default_active(), Active::Never);
}

#[test]
fn test_assembler_merge_combines_file_sets_by_input() {
    let mut base = ArchiveAssembler::new("app");
    let mut docs = FileSet::new("docs");
    docs.includes_mut().unwrap().insert("*.md".to_string());
    base.add_file_set(docs).unwrap();
    base.add_format(Format::Zip).unwrap();

    let mut overlay = ArchiveAssembler::new("app");
    let mut docs = FileSet::new("docs");
    docs.includes_mut().unwrap().insert("*.txt".to_string());
    docs.set_output("share/doc").unwrap();
    overlay.add_file_set(docs).unwrap();
    overlay.add_file_set(FileSet::new("bin")).unwrap();
    overlay.add_format(Format::TarGz).unwrap();

    base.merge(&overlay).unwrap();

    assert_eq!(base.file_sets().len(), 2);
    let docs = &base.file_sets()[0];
    assert_eq!(docs.output(), Some("share/doc"));
    assert_eq!(
        docs.includes().iter().collect::<Vec<_>>(),
        vec!["*.md", "*.txt"]
    );
    assert_eq!(
        base.formats().iter().copied().collect::<Vec<_>>(),
        vec![Format::Zip, Format::TarGz]
    );
}

#[test]
fn test_resolved_file_names_attach_platform() {
    let context = context(model("1.2.0"));
    let mut assembler = ArchiveAssembler::new("app");
    assembler.set_attach_platform(true).unwrap();
    assembler.add_format(Format::Zip).unwrap();
    assembler.add_format(Format::TarGz).unwrap();

    let names = assembler
        .resolved_file_names(&context, Some("linux-x86_64"))
        .unwrap();

    assert_eq!(
        names,
        vec![
            "app-1.2.0-linux-x86_64.zip".to_string(),
            "app-1.2.0-linux-x86_64.tar.gz".to_string(),
        ]
    );
}

#[test]
fn test_resolved_archive_name_ignores_platform_unless_attached() {
    let context = context(model("1.2.0"));
    let mut assembler = ArchiveAssembler::new("app");
    assembler
        .set_archive_name("{{distributionName}}-{{archiveFlavor}}")
        .unwrap();
    assembler
        .add_extra_property("flavor", Value::String("minimal".into()))
        .unwrap();

    let name = assembler.resolved_archive_name(&context, Some("osx")).unwrap();

    assert_eq!(name, "app-minimal");
}

#[test]
fn test_assemble_disabled_disables_archives() {
    let mut assemble = Assemble::default();
    let mut assembler = ArchiveAssembler::new("app");
    assembler.set_active(Active::Always).unwrap();
    assemble.add_archive(assembler).unwrap();
    assemble.set_active(Active::Never).unwrap();

    let enabled = assemble.resolve_enabled_all(&model("1.0.0").project().clone()).unwrap();

    assert!(!enabled);
    assert!(!assemble.archive()["app"].is_enabled());
    assert!(assemble.as_map(false).is_empty());
}

#[test]
fn test_assemble_as_map_lists_enabled_archives() {
    let mut assemble = Assemble::default();
    let mut enabled = ArchiveAssembler::new("app");
    enabled.set_active(Active::Always).unwrap();
    assemble.add_archive(enabled).unwrap();
    assemble.add_archive(ArchiveAssembler::new("docs")).unwrap();

    assemble.resolve_enabled_all(model("1.0.0").project()).unwrap();
    let map = assemble.as_map(false);

    assert_eq!(map["active"], "ALWAYS");
    let archives = map["archive"].as_object().unwrap();
    assert!(archives.contains_key("app"));
    assert!(!archives.contains_key("docs"));
}

#[test]
fn test_normalize_names_uses_map_key() {
    let mut assemble: Assemble = toml::from_str("[archive.bundle]\nformats = [\"zip\"]\n").unwrap();

    assemble.normalize_names().unwrap();

    assert_eq!(assemble.archive()["bundle"].name(), "bundle");
    assert!(assemble.archive()["bundle"].formats().contains(&Format::Zip));
}
