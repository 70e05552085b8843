//! Fixture builders shared by the behaviour suites.
//!
//! Packages are described as `(relative path, content)` pairs and can be
//! materialised either as a plain directory tree or as an archive.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

/// Package members as `(relative path, content)` pairs.
pub type Members = [(String, Vec<u8>)];

/// Write `members` beneath `root`, creating parent directories.
pub fn write_tree(root: &Path, members: &Members) {
    for (name, content) in members {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, content).expect("write member");
    }
}

/// Write `members` as a gzip-compressed tarball.
pub fn write_tar_gz(path: &Path, members: &Members) {
    let encoder = GzEncoder::new(File::create(path).expect("create archive"), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_slice())
            .expect("append member");
    }
    builder
        .into_inner()
        .expect("finish tar stream")
        .finish()
        .expect("finish gzip stream");
}

/// Write `members` as a zip archive.
pub fn write_zip(path: &Path, members: &Members) {
    let mut writer = zip::ZipWriter::new(File::create(path).expect("create archive"));
    for (name, content) in members {
        writer
            .start_file(name.as_str(), zip::write::SimpleFileOptions::default())
            .expect("start member");
        writer.write_all(content).expect("write member");
    }
    writer.finish().expect("finish archive");
}

/// Strip surrounding double quotes from a step argument.
pub fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|stripped| stripped.strip_suffix('"'))
        .unwrap_or(value)
}
