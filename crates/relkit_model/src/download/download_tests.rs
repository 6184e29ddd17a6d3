use super::*;
use crate::secrets::MapSecretResolver;
use crate::test_support::{context, model};

#[test]
fn test_downloaders_default_to_always() {
    let mut download = Download::default();
    download.add_http(HttpDownloader::new("jdk")).unwrap();

    download.resolve_enabled_all(model("1.0.0").project()).unwrap();

    assert!(download.http()["jdk"].is_enabled());
    assert_eq!(download.http()["jdk"].active(), Some(Active::Always));
}

#[test]
fn test_disabled_download_disables_all() {
    let mut download = Download::default();
    download.add_ftp(FtpDownloader::new("mirror")).unwrap();
    download.set_active(Active::Never).unwrap();

    let enabled = download.resolve_enabled_all(model("1.0.0").project()).unwrap();

    assert!(!enabled);
    assert!(!download.ftp()["mirror"].is_enabled());
}

#[test]
fn test_http_input_and_output() {
    let context = context(model("1.0.0"));
    let mut http = HttpDownloader::new("jdk");
    http.add_asset(Asset::new(
        "https://downloads.example/{{downloaderName}}/{{projectName}}-{{projectVersion}}.zip",
    ))
    .unwrap();
    let asset = &http.assets()[0];

    let input = http.resolved_input(&context, asset).unwrap();
    let output = http.resolved_output(&context, asset).unwrap();

    assert_eq!(input, "https://downloads.example/jdk/app-1.0.0.zip");
    assert_eq!(output, "app-1.0.0.zip");
}

#[test]
fn test_output_template() {
    let context = context(model("1.0.0"));
    let http = HttpDownloader::new("jdk");
    let mut asset = Asset::new("https://downloads.example/latest.zip");
    asset.set_output("{{projectName}}-deps.zip").unwrap();

    let output = http.resolved_output(&context, &asset).unwrap();

    assert_eq!(output, "app-deps.zip");
}

#[test]
fn test_ftp_input() {
    let context = context(model("1.0.0"));
    let mut ftp = FtpDownloader::new("mirror");
    ftp.set_host("ftp.example").unwrap();
    ftp.set_port(2121u16).unwrap();
    let asset = Asset::new("/pub/{{projectName}}.tar.gz");

    let input = ftp.resolved_input(&context, &asset).unwrap();

    assert_eq!(input, "ftp://ftp.example:2121/pub/app.tar.gz");
    assert_eq!(ftp.resolved_output(&context, &asset).unwrap(), "app.tar.gz");
}

#[test]
fn test_merge_assets_by_input() {
    let mut base = HttpDownloader::new("jdk");
    base.add_asset(Asset::new("https://a.example/x.zip")).unwrap();
    let mut overlay = HttpDownloader::new("jdk");
    let mut asset = Asset::new("https://a.example/x.zip");
    asset.unpack_mut().unwrap().set_enabled(true).unwrap();
    overlay.add_asset(asset).unwrap();
    overlay.add_asset(Asset::new("https://a.example/y.zip")).unwrap();

    base.merge(&overlay).unwrap();

    assert_eq!(base.assets().len(), 2);
    assert!(base.assets()[0].unpack().is_enabled());
    assert!(!base.assets()[0].unpack().is_skip_root_entry());
}

#[test]
fn test_credentials_resolved_by_name() {
    let mut ftp = FtpDownloader::new("mirror");
    let resolver = MapSecretResolver::new()
        .with("FTP_MIRROR_PASSWORD", "pw")
        .with("FTP_USERNAME", "anonymous");

    ftp.resolve_secrets(&resolver).unwrap();

    assert_eq!(ftp.username(), Some("anonymous"));
    assert_eq!(ftp.password(), Some("pw"));
}

#[test]
fn test_normalize_names_from_toml() {
    let mut download: Download = toml::from_str(
        r#"
[http.jdk]
assets = [{ input = "https://a.example/jdk.zip", unpack = { enabled = true } }]
"#,
    )
    .unwrap();

    download.normalize_names().unwrap();

    let jdk = &download.http()["jdk"];
    assert_eq!(jdk.name(), "jdk");
    assert!(jdk.assets()[0].unpack().is_enabled());
    assert_eq!(download.downloaders().len(), 1);
}

#[test]
fn test_as_map_labels_assets() {
    let mut download = Download::default();
    let mut http = HttpDownloader::new("jdk");
    http.add_asset(Asset::new("https://a.example/jdk.zip")).unwrap();
    http.set_password("secret").unwrap();
    download.add_http(http).unwrap();
    download.resolve_enabled_all(model("1.0.0").project()).unwrap();

    let map = download.as_map(false);

    let jdk = &map["http"]["jdk"];
    assert_eq!(jdk["password"], crate::export::HIDE);
    assert_eq!(jdk["assets"]["asset 0"]["input"], "https://a.example/jdk.zip");
}
