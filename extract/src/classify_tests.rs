//! Unit tests for archive classification.

use super::*;
use crate::test_utils::{write_tar, write_tar_gz, write_tar_zst, write_zip};
use rstest::{fixture, rstest};
use std::fs;
use std::io::Write;
use tempfile::TempDir;

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("temp dir creation succeeds")
}

const MEMBERS: &[(&str, &[u8])] = &[("pkg/README", b"read me"), ("pkg/src/main.c", b"int main;")];

#[rstest]
fn plain_tar_is_tar(temp_dir: TempDir) {
    let path = temp_dir.path().join("pkg.tar");
    write_tar(&path, MEMBERS);
    assert_eq!(
        classify(&path).expect("classify"),
        ArchiveKind::Tar(TarCompression::None)
    );
}

#[rstest]
fn gzip_tar_is_tar(temp_dir: TempDir) {
    let path = temp_dir.path().join("pkg.tar.gz");
    write_tar_gz(&path, MEMBERS);
    assert_eq!(
        classify(&path).expect("classify"),
        ArchiveKind::Tar(TarCompression::Gzip)
    );
}

#[rstest]
fn zstd_tar_is_tar(temp_dir: TempDir) {
    let path = temp_dir.path().join("pkg.tar.zst");
    write_tar_zst(&path, MEMBERS);
    assert_eq!(
        classify(&path).expect("classify"),
        ArchiveKind::Tar(TarCompression::Zstd)
    );
}

#[rstest]
fn zip_is_zip(temp_dir: TempDir) {
    let path = temp_dir.path().join("pkg.zip");
    write_zip(&path, MEMBERS);
    assert_eq!(classify(&path).expect("classify"), ArchiveKind::Zip);
}

#[rstest]
#[case::zip_named_txt("renamed.txt", true)]
#[case::tar_named_zip("renamed.zip", false)]
fn extension_is_ignored(temp_dir: TempDir, #[case] name: &str, #[case] build_zip: bool) {
    let path = temp_dir.path().join(name);
    if build_zip {
        write_zip(&path, MEMBERS);
        assert_eq!(classify(&path).expect("classify"), ArchiveKind::Zip);
    } else {
        write_tar(&path, MEMBERS);
        assert_eq!(
            classify(&path).expect("classify"),
            ArchiveKind::Tar(TarCompression::None)
        );
    }
}

#[rstest]
#[case::text(b"hello, this is not an archive\n")]
#[case::empty(b"")]
#[case::lone_zero_block(&[0u8; 512])]
fn non_archives_are_unrecognised(temp_dir: TempDir, #[case] contents: &[u8]) {
    let path = temp_dir.path().join("plain.tar");
    fs::write(&path, contents).expect("write");
    assert_eq!(classify(&path).expect("classify"), ArchiveKind::Unrecognised);
}

#[rstest]
fn memberless_tar_is_tar(temp_dir: TempDir) {
    let path = temp_dir.path().join("empty.tar");
    write_tar(&path, &[]);
    assert_eq!(fs::read(&path).expect("read").len() % 512, 0);
    assert_eq!(
        classify(&path).expect("classify"),
        ArchiveKind::Tar(TarCompression::None)
    );
}

#[rstest]
fn two_zero_blocks_are_an_empty_tar(temp_dir: TempDir) {
    let path = temp_dir.path().join("zeros");
    fs::write(&path, [0u8; 1024]).expect("write");
    assert_eq!(
        classify(&path).expect("classify"),
        ArchiveKind::Tar(TarCompression::None)
    );
}

#[rstest]
fn zero_block_followed_by_data_is_unrecognised(temp_dir: TempDir) {
    let path = temp_dir.path().join("padded");
    let mut contents = vec![0u8; 512];
    contents.extend_from_slice(&[b'x'; 512]);
    fs::write(&path, contents).expect("write");
    assert_eq!(classify(&path).expect("classify"), ArchiveKind::Unrecognised);
}

#[rstest]
fn gzip_of_plain_text_is_unrecognised(temp_dir: TempDir) {
    let path = temp_dir.path().join("notes.gz");
    let file = fs::File::create(&path).expect("create");
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder
        .write_all(&b"plain words ".repeat(100))
        .expect("write");
    encoder.finish().expect("finish");
    assert_eq!(classify(&path).expect("classify"), ArchiveKind::Unrecognised);
}

#[rstest]
fn missing_file_is_an_io_error(temp_dir: TempDir) {
    assert!(classify(&temp_dir.path().join("absent")).is_err());
}

#[rstest]
#[case::gzip(&[0x1f, 0x8b, 0x08], TarCompression::Gzip)]
#[case::bzip2(b"BZh91A", TarCompression::Bzip2)]
#[case::xz(&[0xfd, b'7', b'z', b'X', b'Z', 0x00], TarCompression::Xz)]
#[case::zstd(&[0x28, 0xb5, 0x2f, 0xfd], TarCompression::Zstd)]
#[case::bare(b"pkg/", TarCompression::None)]
fn sniffs_compression_magic(#[case] magic: &[u8], #[case] expected: TarCompression) {
    assert_eq!(TarCompression::sniff(magic), expected);
}

#[rstest]
fn header_checksum_mismatch_is_rejected() {
    let mut header = tar::Header::new_ustar();
    header.set_path("file.txt").expect("path");
    header.set_size(0);
    header.set_cksum();
    let mut block = *header.as_bytes();
    assert!(is_tar_header(&block));

    if let Some(byte) = block.get_mut(0) {
        *byte = b'g';
    }
    assert!(!is_tar_header(&block));
}

#[rstest]
#[case::nul_terminated(b"0001234\0", Some(0o1234))]
#[case::space_padded(b" 1234 \0 ", Some(0o1234))]
#[case::blank(b"        ", None)]
#[case::not_octal(b"00009\0  ", None)]
fn parses_octal_fields(#[case] field: &[u8], #[case] expected: Option<u64>) {
    assert_eq!(parse_octal(field), expected);
}

#[rstest]
fn display_names_compression() {
    assert_eq!(
        ArchiveKind::Tar(TarCompression::Gzip).to_string(),
        "tar+gzip"
    );
    assert_eq!(ArchiveKind::Zip.to_string(), "zip");
}
