use super::*;
use crate::errors::ConfigurationError;
use crate::secrets::MapSecretResolver;
use crate::test_support::{context, model};

fn artifact() -> Artifact {
    Artifact::new("out/app-1.0.0.zip")
}

#[test]
fn test_uploaders_default_to_never() {
    let mut upload = Upload::default();
    upload.add_http(HttpUploader::new("nexus")).unwrap();

    let enabled = upload.resolve_enabled_all(model("1.0.0").project()).unwrap();

    assert!(enabled);
    assert!(!upload.http()["nexus"].is_enabled());
    assert_eq!(upload.http()["nexus"].active(), Some(Active::Never));
}

#[test]
fn test_disabled_upload_disables_all() {
    let mut upload = Upload::default();
    let mut ftp = FtpUploader::new("mirror");
    ftp.set_active(Active::Always).unwrap();
    upload.add_ftp(ftp).unwrap();
    upload.set_active(Active::Never).unwrap();

    upload.resolve_enabled_all(model("1.0.0").project()).unwrap();

    assert!(!upload.ftp()["mirror"].is_enabled());
    assert!(upload.as_map(false).is_empty());
}

#[test]
fn test_find_by_type_and_name() {
    let mut upload = Upload::default();
    upload.add_gitlab(GitlabUploader::new("packages")).unwrap();
    upload.add_gitea(GiteaUploader::new("packages")).unwrap();

    assert_eq!(upload.find("gitlab", "packages").unwrap().kind(), "gitlab");
    assert_eq!(upload.find("gitea", "packages").unwrap().kind(), "gitea");
    assert!(upload.find("ftp", "packages").is_none());
    assert!(upload.find("s3", "packages").is_none());
    assert_eq!(upload.uploaders().len(), 2);
}

#[test]
fn test_names_filled_from_keys() {
    let mut upload: Upload = toml::from_str(
        r#"
[http.nexus]
upload_url = "https://nexus.example/{{artifactFileName}}"
method = "post"
"#,
    )
    .unwrap();

    upload.normalize_names().unwrap();

    let nexus = &upload.http()["nexus"];
    assert_eq!(nexus.name(), "nexus");
    assert_eq!(nexus.method(), HttpMethod::Post);
}

#[test]
fn test_unknown_http_method_rejected() {
    let result = toml::from_str::<Upload>("[http.nexus]\nmethod = \"PATCH\"\n");

    assert!(result.is_err());
}

#[test]
fn test_http_urls() {
    let context = context(model("1.0.0"));
    let mut http = HttpUploader::new("nexus");
    http.set_upload_url("https://nexus.example/{{uploaderName}}/{{artifactFileName}}")
        .unwrap();

    let upload_url = http.resolved_upload_url(&context, &artifact()).unwrap();
    let download_url = http.resolved_download_url(&context, &artifact()).unwrap();

    assert_eq!(upload_url, "https://nexus.example/nexus/app-1.0.0.zip");
    assert_eq!(download_url, upload_url);
}

#[test]
fn test_http_blank_upload_url() {
    let context = context(model("1.0.0"));
    let http = HttpUploader::new("nexus");

    let result = http.resolved_upload_url(&context, &artifact());

    match result {
        Err(ConfigurationError::InvalidValue { field, .. }) => {
            assert_eq!(field, "upload.http.nexus.upload_url")
        }
        other => panic!("Expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn test_http_headers_expanded() {
    let context = context(model("1.0.0"));
    let mut http = HttpUploader::new("nexus");
    http.headers_mut()
        .unwrap()
        .insert("X-Version".to_string(), "{{projectVersion}}".to_string());

    let headers = http.resolved_headers(&context, &artifact()).unwrap();

    assert_eq!(headers["X-Version"], "1.0.0");
}

#[test]
fn test_http_credentials_by_name() {
    let mut http = HttpUploader::new("nexus");
    let resolver = MapSecretResolver::new()
        .with("HTTP_NEXUS_USERNAME", "deployer")
        .with("HTTP_PASSWORD", "hunter2");

    http.resolve_secrets(&resolver).unwrap();

    assert_eq!(http.username(), Some("deployer"));
    assert_eq!(http.password(), Some("hunter2"));
}

#[test]
fn test_ftp_urls() {
    let context = context(model("1.0.0"));
    let mut ftp = FtpUploader::new("mirror");
    ftp.set_host("ftp.example").unwrap();
    ftp.set_path("/pub/{{projectName}}/{{artifactFileName}}").unwrap();

    let url = ftp.resolved_upload_url(&context, &artifact()).unwrap();

    assert_eq!(url, "ftp://ftp.example:21/pub/app/app-1.0.0.zip");
    assert_eq!(ftp.resolved_download_url(&context, &artifact()).unwrap(), url);
}

#[test]
fn test_gitlab_package_url() {
    let context = context(model("1.0.0"));
    let mut gitlab = GitlabUploader::new("packages");
    gitlab.set_project_identifier("1234").unwrap();

    let url = gitlab.resolved_upload_url(&context, &artifact()).unwrap();

    assert_eq!(
        url,
        "https://gitlab.com/api/v4/projects/1234/packages/generic/app/1.0.0/app-1.0.0.zip"
    );
}

#[test]
fn test_gitlab_token_lookup_order() {
    let gitlab = GitlabUploader::new("packages");

    assert_eq!(
        gitlab.secret_variables(),
        vec!["GITLAB_PACKAGES_TOKEN".to_string(), "GITLAB_TOKEN".to_string()]
    );
}

#[test]
fn test_gitea_package_url() {
    let context = context(model("2.0.0"));
    let mut gitea = GiteaUploader::new("packages");
    gitea.set_host("gitea.example").unwrap();
    gitea.set_owner("acme").unwrap();
    gitea.set_package_name("{{projectName}}-bin").unwrap();

    let url = gitea.resolved_upload_url(&context, &artifact()).unwrap();

    assert_eq!(
        url,
        "https://gitea.example/api/packages/acme/generic/app-bin/2.0.0/app-1.0.0.zip"
    );
}

#[test]
fn test_merge_uploaders_by_name() {
    let mut base = Upload::default();
    let mut http = HttpUploader::new("nexus");
    http.set_upload_url("https://a.example").unwrap();
    base.add_http(http).unwrap();

    let mut overlay = Upload::default();
    let mut http = HttpUploader::new("nexus");
    http.set_checksums(false).unwrap();
    overlay.add_http(http).unwrap();

    base.merge(&overlay).unwrap();

    let nexus = &base.http()["nexus"];
    assert_eq!(nexus.upload_url(), Some("https://a.example"));
    assert!(!nexus.is_checksums());
    assert!(nexus.is_artifacts());
}

#[test]
fn test_as_map_lists_enabled_uploaders() {
    let mut upload = Upload::default();
    let mut ftp = FtpUploader::new("mirror");
    ftp.set_active(Active::Always).unwrap();
    ftp.set_password("secret").unwrap();
    upload.add_ftp(ftp).unwrap();
    upload.add_http(HttpUploader::new("nexus")).unwrap();
    upload.resolve_enabled_all(model("1.0.0").project()).unwrap();

    let map = upload.as_map(false);

    assert_eq!(map["ftp"]["mirror"]["password"], crate::export::HIDE);
    assert!(map.get("http").is_none());
}
