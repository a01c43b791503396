use aes::Aes256;
use cfb_mode::Encryptor;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER_SIZE: u32 = 32;
const ENTRY_SIZE: u32 = 30;
const BLOCK_SIZE: u32 = 65536;
const FLAG_ENCRYPTED_TOC: u32 = 4;
const TOC_KEY: [u8; 32] = [
    0xC5, 0x3D, 0xB2, 0x38, 0x70, 0xA1, 0xA2, 0xF7, 0x1C, 0xAE, 0x64, 0x06, 0x1F, 0xDD, 0x0E, 0x11,
    0x57, 0x30, 0x9D, 0xC8, 0x52, 0x04, 0xD4, 0xC5, 0xBF, 0xDF, 0x25, 0x09, 0x0D, 0xF2, 0x57, 0x2C,
];

/// Write a small unencrypted, zlib-compressed PSARC archive to `path`.
/// Every file fits in a single block.
pub fn write_psarc(path: &Path, files: &[(&str, &str)]) {
    fs::write(path, build_psarc(files, false)).unwrap();
}

/// Same as [`write_psarc`] with the table of contents encrypted, as in
/// archives shipped for the game.
pub fn write_encrypted_psarc(path: &Path, files: &[(&str, &str)]) {
    fs::write(path, build_psarc(files, true)).unwrap();
}

fn build_psarc(files: &[(&str, &str)], encrypt: bool) -> Vec<u8> {
    let listing = files
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join("\n");
    let mut payloads = vec![listing.into_bytes()];
    payloads.extend(files.iter().map(|(_, data)| data.as_bytes().to_vec()));

    let entry_count = payloads.len() as u32;
    let toc_length = HEADER_SIZE + entry_count * ENTRY_SIZE + 2 * entry_count;
    let mut toc = Vec::new();
    let mut block_lengths = Vec::new();
    let mut data = Vec::new();

    for (index, payload) in payloads.iter().enumerate() {
        let offset = u64::from(toc_length) + data.len() as u64;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).unwrap();
        let compressed = encoder.finish().unwrap();

        let digest = if index == 0 {
            [0u8; 16]
        } else {
            md5::compute(files[index - 1].0.as_bytes()).0
        };
        toc.extend_from_slice(&digest);
        toc.extend_from_slice(&(index as u32).to_be_bytes());
        toc.extend_from_slice(&(payload.len() as u64).to_be_bytes()[3..]);
        toc.extend_from_slice(&offset.to_be_bytes()[3..]);

        block_lengths.extend_from_slice(&(compressed.len() as u16).to_be_bytes());
        data.extend_from_slice(&compressed);
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"PSAR");
    out.extend_from_slice(&0x0001_0004u32.to_be_bytes());
    out.extend_from_slice(b"zlib");
    out.extend_from_slice(&toc_length.to_be_bytes());
    out.extend_from_slice(&ENTRY_SIZE.to_be_bytes());
    out.extend_from_slice(&entry_count.to_be_bytes());
    out.extend_from_slice(&BLOCK_SIZE.to_be_bytes());

    let mut table = toc;
    table.extend_from_slice(&block_lengths);
    if encrypt {
        out.extend_from_slice(&FLAG_ENCRYPTED_TOC.to_be_bytes());
        Encryptor::<Aes256>::new(&TOC_KEY.into(), &[0u8; 16].into()).encrypt(&mut table);
    } else {
        out.extend_from_slice(&0u32.to_be_bytes());
    }
    out.extend_from_slice(&table);
    out.extend_from_slice(&data);
    out
}

/// A song manifest with one arrangement entry.
pub fn manifest(artist: &str, artist_sort: &str, song: &str, song_sort: &str, dd: u32) -> String {
    format!(
        r#"{{
  "Entries": {{
    "ABCDEF0123": {{
      "Attributes": {{
        "ArtistName": "{artist}",
        "ArtistNameSort": "{artist_sort}",
        "SongName": "{song}",
        "SongNameSort": "{song_sort}",
        "MaxPhraseDifficulty": {dd}
      }}
    }}
  }},
  "ModelName": "RSEnumerable_Song"
}}"#
    )
}

/// Write an archive holding a manifest, a sidecar and some audio bytes, with
/// an encrypted table of contents.
pub fn write_song(dir: &Path, file_name: &str, manifest_json: &str) -> PathBuf {
    let path = dir.join(file_name);
    write_encrypted_psarc(
        &path,
        &[
            ("audio/windows/123456.wem", "not really audio"),
            ("manifests/songs_dlc_song/song_lead.json", manifest_json),
            ("toolkit.version", "Toolkit version: 2.9.2\nPackage Author: someone\nPackage Version: 3\n"),
        ],
    );
    path
}
