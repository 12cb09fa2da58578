//! End-to-end pipeline tests over a mocked artifact origin.

use std::io::Write;
use std::path::Path;

use binhub_core::run::{RunConfig, run};
use binhub_schema::{RootIndex, VersionIndex};

const JQ_PAYLOAD: &[u8] = b"#!/bin/sh\necho jq 1.6\n";
const GH_PAYLOAD: &[u8] = b"#!/bin/sh\necho gh 2.40.1\n";

fn gh_zip_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut bytes));
        writer
            .start_file(
                "gh_2.40.1/bin/gh",
                zip::write::SimpleFileOptions::default(),
            )
            .unwrap();
        writer.write_all(GH_PAYLOAD).unwrap();
        writer.finish().unwrap();
    }
    bytes
}

fn sha256_hex(data: &[u8]) -> String {
    binhub_core::digest::digest_reader(data).unwrap()
}

/// Write the descriptor fixtures: a raw jq with a valid checksum, a gh zip
/// where one variant points at a missing entry, and one malformed file.
fn write_descriptors(dir: &Path, origin: &str) {
    std::fs::create_dir_all(dir.join("j")).unwrap();
    std::fs::create_dir_all(dir.join("g")).unwrap();
    std::fs::create_dir_all(dir.join("b")).unwrap();

    let jq = format!(
        r#"
name: jq
description: Command-line JSON processor
homepage: https://jqlang.github.io/jq
repository: https://github.com/jqlang/jq
license: MIT
version: "1.6"
tags: [json, cli]
architectures:
  linux-amd64:
    url: {origin}/jq
    type: raw
    sha256: {digest}
"#,
        digest = sha256_hex(JQ_PAYLOAD)
    );
    std::fs::write(dir.join("j/jq.yaml"), jq).unwrap();

    let gh = format!(
        r#"
name: gh
description: GitHub CLI
homepage: https://cli.github.com
repository: https://github.com/cli/cli
license: MIT
version: "2.40.1"
tags: [github]
architectures:
  darwin-arm64:
    url: {origin}/gh.zip
    type: zip
    binary_path_in_archive: gh_2.40.1/bin/gh-not-there
  linux-amd64:
    url: {origin}/gh.zip
    type: zip
    binary_path_in_archive: gh_2.40.1/bin/gh
"#
    );
    std::fs::write(dir.join("g/gh.yaml"), gh).unwrap();

    std::fs::write(dir.join("b/bad.yaml"), "version: [unterminated").unwrap();
}

#[tokio::test]
async fn pipeline_publishes_catalog_and_isolates_failures() {
    let mut server = mockito::Server::new_async().await;
    let _jq = server
        .mock("GET", "/jq")
        .with_body(JQ_PAYLOAD)
        .create_async()
        .await;
    let _gh = server
        .mock("GET", "/gh.zip")
        .with_body(gh_zip_bytes())
        .create_async()
        .await;

    let descriptors = tempfile::tempdir().unwrap();
    write_descriptors(descriptors.path(), &server.url());

    let output = tempfile::tempdir().unwrap();
    let config = RunConfig {
        descriptors_dir: descriptors.path().to_path_buf(),
        output_root: output.path().to_path_buf(),
        ..RunConfig::default()
    };

    let summary = run(&config).await.unwrap();
    assert_eq!(summary.found, 3);
    assert_eq!(summary.processed, 2); // bad.yaml excluded
    assert_eq!(summary.published, 2); // jq linux + gh linux
    assert_eq!(summary.skipped, 1); // gh darwin, entry not found

    // Published jq binary: exact bytes, mode 0755.
    let jq_bin = output.path().join("j/jq/1.6/linux-amd64/jq");
    assert_eq!(std::fs::read(&jq_bin).unwrap(), JQ_PAYLOAD);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&jq_bin).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    // Published gh binary is the zip entry's bytes.
    let gh_bin = output.path().join("g/gh/2.40.1/linux-amd64/gh");
    assert_eq!(std::fs::read(&gh_bin).unwrap(), GH_PAYLOAD);

    // Root catalog lists both letter buckets.
    let root: RootIndex = serde_json::from_str(
        &std::fs::read_to_string(output.path().join("api.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(root.directories, vec!["g", "j"]);

    // jq version catalog carries the declared checksum and the real size.
    let jq_version: VersionIndex = serde_json::from_str(
        &std::fs::read_to_string(output.path().join("j/jq/1.6/api.json")).unwrap(),
    )
    .unwrap();
    let variant = &jq_version.architectures["linux-amd64"];
    assert_eq!(variant.url, "/j/jq/1.6/linux-amd64/jq");
    assert_eq!(variant.size, JQ_PAYLOAD.len() as u64);
    assert_eq!(
        variant.sha256.as_ref().unwrap().as_str(),
        sha256_hex(JQ_PAYLOAD)
    );

    // The failed darwin variant is simply absent from gh's version catalog.
    let gh_version: VersionIndex = serde_json::from_str(
        &std::fs::read_to_string(output.path().join("g/gh/2.40.1/api.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(gh_version.architectures.len(), 1);
    assert!(gh_version.architectures.contains_key("linux-amd64"));
    assert!(
        !output
            .path()
            .join("g/gh/2.40.1/darwin-arm64")
            .join("gh")
            .exists()
    );

    // The HTML index reflects the processed descriptors.
    let html = std::fs::read_to_string(output.path().join("index.html")).unwrap();
    assert!(html.contains("2 binaries available"));
    assert!(html.contains("<strong>jq</strong>"));
}

#[tokio::test]
async fn reruns_produce_identical_output() {
    let mut server = mockito::Server::new_async().await;
    let _jq = server
        .mock("GET", "/jq")
        .with_body(JQ_PAYLOAD)
        .create_async()
        .await;
    let _gh = server
        .mock("GET", "/gh.zip")
        .with_body(gh_zip_bytes())
        .create_async()
        .await;

    let descriptors = tempfile::tempdir().unwrap();
    write_descriptors(descriptors.path(), &server.url());

    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    for output in [&first, &second] {
        let config = RunConfig {
            descriptors_dir: descriptors.path().to_path_buf(),
            output_root: output.path().to_path_buf(),
            jobs: 4, // concurrency must not change the output
            ..RunConfig::default()
        };
        run(&config).await.unwrap();
    }

    for relative in [
        "api.json",
        "g/api.json",
        "g/gh/api.json",
        "g/gh/2.40.1/api.json",
        "j/api.json",
        "j/jq/api.json",
        "j/jq/1.6/api.json",
        "j/jq/1.6/linux-amd64/jq",
        "g/gh/2.40.1/linux-amd64/gh",
        "index.html",
    ] {
        assert_eq!(
            std::fs::read(first.path().join(relative)).unwrap(),
            std::fs::read(second.path().join(relative)).unwrap(),
            "{relative} differs between runs"
        );
    }
}

#[tokio::test]
async fn empty_descriptor_set_still_publishes_catalog() {
    let descriptors = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let config = RunConfig {
        descriptors_dir: descriptors.path().to_path_buf(),
        output_root: output.path().to_path_buf(),
        ..RunConfig::default()
    };

    let summary = run(&config).await.unwrap();
    assert_eq!(summary, binhub_core::RunSummary::default());

    let root: RootIndex = serde_json::from_str(
        &std::fs::read_to_string(output.path().join("api.json")).unwrap(),
    )
    .unwrap();
    assert!(root.directories.is_empty());
    assert!(output.path().join("index.html").is_file());
}
