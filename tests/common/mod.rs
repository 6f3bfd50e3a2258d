//! Shared fixtures: a small zip archive and a local endpoint serving it.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock server serves the archive under.
pub const ARCHIVE_PATH: &str = "/zipstream/archive.zip";

/// The two entries every fixture archive contains.
pub const FILES: [(&str, &str); 2] = [
    ("file1.txt", "This is the content of file1.txt"),
    ("file2.txt", "This is the content of file2.txt"),
];

/// Build a zip holding `files` in memory.
pub fn zip_of(files: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, body) in files {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// The standard two-file archive.
pub fn dummy_zip() -> Vec<u8> {
    zip_of(&FILES)
}

/// Start a server answering `GET ARCHIVE_PATH` with `body` as a zip.
pub async fn serve_zip(body: Vec<u8>) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ARCHIVE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/zip")
                .set_body_bytes(body),
        )
        .mount(&mock_server)
        .await;
    mock_server
}

pub fn archive_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), ARCHIVE_PATH)
}

/// Assert both fixture files were extracted into `dir` with exact content.
pub fn assert_extracted(dir: &Path) {
    for (name, body) in FILES {
        let path = dir.join(name);
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read extracted file {}: {}", path.display(), e));
        assert_eq!(content, body, "content mismatch for {}", name);
    }
}
