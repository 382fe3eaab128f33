//! Shared helpers for the ghrab test suites.
//!
//! Builders for in-memory archives and for GitHub API response bodies
//! pointing back at a wiremock server.

// Allow dead code because the helpers are shared between the unit and
// integration harnesses and not every harness uses all of them
#![allow(dead_code)]

use std::io::Write;

/// Build a zip archive in memory from `(path, content)` entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (path, content) in entries {
        zip.start_file(*path, options).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Build a gzip-compressed tar archive in memory from `(path, content)` entries.
pub fn tar_gz_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, *path, *content).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Build a tar.gz whose second entry carries a raw (unsanitized) path.
///
/// `tar::Builder` refuses to write `..` or absolute entry paths, so this
/// pokes the GNU header name bytes directly to produce a malicious archive.
pub fn evil_tar_gz(evil_path: &[u8]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut ok = tar::Header::new_gnu();
    ok.set_size(2);
    ok.set_mode(0o644);
    ok.set_cksum();
    builder.append_data(&mut ok, "safe.txt", &b"ok"[..]).unwrap();

    let mut header = tar::Header::new_gnu();
    header.as_gnu_mut().unwrap().name[..evil_path.len()].copy_from_slice(evil_path);
    header.set_size(3);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append(&header, &b"bad"[..]).unwrap();

    builder.into_inner().unwrap().finish().unwrap()
}

/// GitHub release JSON whose asset URLs point at the given mock server.
///
/// Each `(id, name)` asset gets an API download URL of
/// `{server}/api-download/{id}` and a browser URL of `{server}/dl/{name}`.
pub fn release_json(server_uri: &str, tag: &str, assets: &[(u64, &str)]) -> serde_json::Value {
    let assets: Vec<serde_json::Value> = assets
        .iter()
        .map(|(id, name)| {
            serde_json::json!({
                "id": id,
                "name": name,
                "size": 0,
                "url": format!("{server_uri}/api-download/{id}"),
                "browser_download_url": format!("{server_uri}/dl/{name}"),
            })
        })
        .collect();

    serde_json::json!({
        "tag_name": tag,
        "name": tag,
        "assets": assets,
        "zipball_url": format!("{server_uri}/zipball/{tag}"),
        "tarball_url": format!("{server_uri}/tarball/{tag}"),
    })
}
