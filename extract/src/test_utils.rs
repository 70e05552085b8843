//! Archive builders shared by the unit tests in this crate.

use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Files to place in a test archive as `(name, contents)` pairs.
pub type Members<'a> = &'a [(&'a str, &'a [u8])];

/// Append `members` as regular files to a tar builder.
fn append_members<W: Write>(builder: &mut tar::Builder<W>, members: Members<'_>) {
    for (name, contents) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *contents)
            .expect("append tar member");
    }
}

/// Write an uncompressed tar archive.
pub fn write_tar(path: &Path, members: Members<'_>) {
    let mut builder = tar::Builder::new(File::create(path).expect("create tar"));
    append_members(&mut builder, members);
    builder.finish().expect("tar finish");
}

/// Write a gzip-compressed tar archive.
pub fn write_tar_gz(path: &Path, members: Members<'_>) {
    let file = File::create(path).expect("create tar.gz");
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    append_members(&mut builder, members);
    let encoder = builder.into_inner().expect("tar finish");
    encoder.finish().expect("gzip finish");
}

/// Write a zstd-compressed tar archive.
pub fn write_tar_zst(path: &Path, members: Members<'_>) {
    let file = File::create(path).expect("create tar.zst");
    let encoder = zstd::Encoder::new(file, 0).expect("zstd encoder");
    let mut builder = tar::Builder::new(encoder);
    append_members(&mut builder, members);
    let encoder = builder.into_inner().expect("tar finish");
    encoder.finish().expect("zstd finish");
}

/// Write a zip archive. Names ending in `/` become directory entries.
pub fn write_zip(path: &Path, members: Members<'_>) {
    let mut writer = zip::ZipWriter::new(File::create(path).expect("create zip"));
    let options = zip::write::SimpleFileOptions::default();
    for (name, contents) in members {
        if name.ends_with('/') {
            writer
                .add_directory(*name, options)
                .expect("add zip directory");
        } else {
            writer.start_file(*name, options).expect("start zip member");
            writer.write_all(contents).expect("write zip member");
        }
    }
    writer.finish().expect("zip finish");
}

/// Write a tar whose single header claims a traversal path.
///
/// `tar::Builder` refuses such names, so the header bytes are set directly.
pub fn write_traversal_tar(path: &Path, name: &str, contents: &[u8]) {
    let mut header = tar::Header::new_old();
    {
        let raw = header.as_old_mut();
        let bytes = name.as_bytes();
        raw.name
            .get_mut(..bytes.len())
            .expect("name fits header")
            .copy_from_slice(bytes);
    }
    header.set_size(contents.len() as u64);
    header.set_mode(0o644);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_cksum();

    let mut builder = tar::Builder::new(File::create(path).expect("create tar"));
    builder
        .append(&header, contents)
        .expect("append raw header");
    builder.finish().expect("tar finish");
}

/// Write a tar whose first member is directory `dir` with permission bits
/// `mode`, followed by `members` as regular files.
pub fn write_tar_with_dir(path: &Path, dir: &str, mode: u32, members: Members<'_>) {
    let mut builder = tar::Builder::new(File::create(path).expect("create tar"));
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Directory);
    header.set_size(0);
    header.set_mode(mode);
    header.set_cksum();
    builder
        .append_data(&mut header, dir, std::io::empty())
        .expect("append tar directory");
    append_members(&mut builder, members);
    builder.finish().expect("tar finish");
}

/// Bytes that deflate cannot shrink, so truncating a compressed archive
/// cuts into member data rather than the headers before it.
pub fn incompressible(len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state.to_le_bytes()[0]
        })
        .collect()
}
