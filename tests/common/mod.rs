#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use pp20th_dat::{padded_len, Endian, GameVersion, SENTINEL};
use tempfile::TempDir;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// A table entry as it sits in the executable, plus extra opaque bytes after it.
pub struct RawEntry {
    pub offset: u32,
    pub length: u32,
    pub extra: usize,
}

fn put_u32(buf: &mut [u8], at: usize, endian: Endian, value: u32) {
    let bytes = match endian {
        Endian::Big => value.to_be_bytes(),
        Endian::Little => value.to_le_bytes(),
    };
    buf[at..at + 4].copy_from_slice(&bytes);
}

/// Offset of the first entry inside an executable of `version`.
pub fn first_entry(version: GameVersion) -> usize {
    let layout = version.layout();
    (layout.table_offset + 20 + 4 + layout.first_entry_gap) as usize
}

/// An executable of the exact size for `version` carrying `entries` in its table.
pub fn executable(version: GameVersion, entries: &[RawEntry]) -> Vec<u8> {
    let layout = version.layout();
    let mut exe = vec![0u8; layout.exe_len as usize];

    // something recognisable outside the table
    for (i, byte) in exe[..0x1000].iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }

    put_u32(&mut exe, layout.table_offset as usize + 20, layout.endian, entries.len() as u32);

    let mut at = first_entry(version);
    for (number, entry) in entries.iter().enumerate() {
        exe[at..at + 4].copy_from_slice(&[0x12, 0x34, 0x56, 0x78]);
        put_u32(&mut exe, at + 4, layout.endian, entry.offset);
        put_u32(&mut exe, at + 8, layout.endian, entry.length);
        exe[at + 16..at + 20].copy_from_slice(&SENTINEL.to_le_bytes());
        exe[at + 20..at + 24].copy_from_slice(&(number as u32).to_le_bytes());
        for byte in &mut exe[at + 24..at + 24 + entry.extra] {
            *byte = 0x42;
        }
        at += 24 + entry.extra;
    }

    exe
}

/// Lay payloads out back to back on block boundaries, the way a rebuilt archive looks.
pub fn pack(payloads: &[Vec<u8>], extras: &[usize]) -> (Vec<u8>, Vec<RawEntry>) {
    let mut archive = Vec::new();
    let mut entries = Vec::new();

    for (payload, extra) in payloads.iter().zip(extras) {
        entries.push(RawEntry {
            offset: archive.len() as u32,
            length: payload.len() as u32,
            extra: *extra,
        });
        archive.extend_from_slice(payload);
        archive.resize(padded_len(archive.len() as u64) as usize, 0);
    }

    (archive, entries)
}

pub fn sample_payloads() -> Vec<Vec<u8>> {
    let mut font = b"FNT\0".to_vec();
    font.extend((0..4996).map(|i| (i % 7) as u8));

    let mut riff = b"RIFF".to_vec();
    riff.extend_from_slice(&[0x24, 0, 0, 0]);
    riff.extend_from_slice(b"WAVEfmt ");

    vec![font, b"abc".to_vec(), riff, Vec::new(), b"#ifndef GAME_H\n#define GAME_H\n#endif\n".to_vec()]
}

pub fn write(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

pub struct Workspace {
    pub dir: TempDir,
    pub exe: PathBuf,
    pub game_dat: PathBuf,
}

impl Workspace {
    pub fn new(exe: &[u8], game_dat: &[u8]) -> Workspace {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        let exe = write(dir.path(), "main.dol", exe);
        let game_dat = write(dir.path(), "GAME.DAT", game_dat);
        Workspace { dir, exe, game_dat }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
