// Emacs style mode select   -*- C++ -*-
//-----------------------------------------------------------------------------
//
// $Id:$
//
// Copyright (C) 1993-1996 by id Software, Inc.
//
// This source is available for distribution and/or modification
// only under the terms of the DOOM Source Code License as
// published by id Software. All rights reserved.
//
// The source is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// FITNESS FOR A PARTICULAR PURPOSE. See the DOOM Source Code License
// for more details.
//
// $Log:$
//
// DESCRIPTION:
// Handles WAD file header, directory, lump I/O.
//
//-----------------------------------------------------------------------------

use std::path::Path;

use log::{debug, info};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WadError {
    #[error("couldn't read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("wad file {0} doesn't have IWAD or PWAD id")]
    BadIdentification(String),

    #[error("wad file {0} has a truncated directory")]
    Truncated(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} >= numlumps")]
    BadLumpNum(usize),
}

struct LumpInfo {
    name: [u8; 8],
    data: Vec<u8>,
}

//
// The lump namespace.
// Lumps are held in memory once a file is added,
//  so lookups by number never touch the disk.
//
#[derive(Default)]
pub struct Wad {
    lumpinfo: Vec<LumpInfo>,
}

impl std::fmt::Debug for Wad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wad").field("numlumps", &self.lumpinfo.len()).finish()
    }
}

//
// name8
// Upper case, zero padded lump name.
//
pub fn name8(name: &str) -> [u8; 8] {
    let mut dest = [0u8; 8];
    for (d, c) in dest.iter_mut().zip(name.bytes()) {
        if c == 0 {
            break;
        }
        *d = c.to_ascii_uppercase();
    }
    dest
}

//
// lump_name_str
// Printable form of a (possibly full 8 char) lump name.
//
pub fn lump_name_str(name: &[u8]) -> String {
    name.iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as char)
        .collect()
}

fn read_i32(bytes: &[u8], ofs: usize) -> Option<i32> {
    bytes
        .get(ofs..ofs + 4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn extract_file_base(path: &Path) -> [u8; 8] {
    let base = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    name8(base)
}

impl Wad {
    pub fn new() -> Self {
        Self::default()
    }

    //
    // open
    // A namespace made of a single file.
    //
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WadError> {
        let mut wad = Self::new();
        wad.add_file(path)?;
        Ok(wad)
    }

    //
    // add_file
    // Files with a .wad extension are wadlink files
    //  with multiple lumps.
    // Other files are single lumps with the base filename
    //  for the lump name.
    // Lump names can appear multiple times.
    // The name searcher looks backwards, so a later file
    //  does override all earlier ones.
    //
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), WadError> {
        let path = path.as_ref();
        let filename = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| WadError::Io {
            path: filename.clone(),
            source,
        })?;

        info!(" adding {}", filename);

        let is_wad = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wad"));

        if !is_wad {
            // single lump file
            self.lumpinfo.push(LumpInfo {
                name: extract_file_base(path),
                data: bytes,
            });
            return Ok(());
        }

        self.add_wad_bytes(&bytes, &filename)
    }

    //
    // add_wad_bytes
    // Parses a complete IWAD/PWAD image.
    //
    pub fn add_wad_bytes(&mut self, bytes: &[u8], filename: &str) -> Result<(), WadError> {
        let identification = bytes.get(0..4).ok_or_else(|| WadError::Truncated(filename.into()))?;
        if identification != b"IWAD" && identification != b"PWAD" {
            return Err(WadError::BadIdentification(filename.into()));
        }

        let truncated = || WadError::Truncated(filename.into());
        let numlumps = read_i32(bytes, 4).ok_or_else(truncated)?;
        let infotableofs = read_i32(bytes, 8).ok_or_else(truncated)?;
        if numlumps < 0 || infotableofs < 0 {
            return Err(truncated());
        }

        // the directory must fit in the file before anything is allocated
        let tableend = (numlumps as usize)
            .checked_mul(16)
            .and_then(|len| len.checked_add(infotableofs as usize));
        if tableend.map_or(true, |end| end > bytes.len()) {
            return Err(truncated());
        }

        let mut fileinfo = Vec::with_capacity(numlumps as usize);
        for i in 0..numlumps as usize {
            let entry = (infotableofs as usize) + i * 16;
            let filepos = read_i32(bytes, entry).ok_or_else(truncated)?;
            let size = read_i32(bytes, entry + 4).ok_or_else(truncated)?;
            let name_bytes = bytes.get(entry + 8..entry + 16).ok_or_else(truncated)?;
            let mut name = [0u8; 8];
            name.copy_from_slice(name_bytes);

            let start = filepos.max(0) as usize;
            let data = bytes
                .get(start..start + size.max(0) as usize)
                .ok_or_else(truncated)?;
            fileinfo.push(LumpInfo {
                name,
                data: data.to_vec(),
            });
        }

        debug!("{}: {} lumps", filename, fileinfo.len());
        self.lumpinfo.extend(fileinfo);
        Ok(())
    }

    //
    // push_lump
    // Appends a lump built in memory, returns its number.
    //
    pub fn push_lump(&mut self, name: &str, data: Vec<u8>) -> usize {
        self.lumpinfo.push(LumpInfo {
            name: name8(name),
            data,
        });
        self.lumpinfo.len() - 1
    }

    pub fn num_lumps(&self) -> usize {
        self.lumpinfo.len()
    }

    //
    // check_num_for_name
    // Returns None if name not found.
    //
    pub fn check_num_for_name(&self, name: &str) -> Option<usize> {
        let name8 = name8(name);

        // scan backwards so patch lump files take precedence
        self.lumpinfo.iter().rposition(|lump| lump.name == name8)
    }

    //
    // get_num_for_name
    // Calls check_num_for_name, but bombs out if not found.
    //
    pub fn get_num_for_name(&self, name: &str) -> Result<usize, WadError> {
        self.check_num_for_name(name)
            .ok_or_else(|| WadError::NotFound(name.to_string()))
    }

    pub fn lump_name(&self, lump: usize) -> Result<&[u8; 8], WadError> {
        self.lumpinfo
            .get(lump)
            .map(|l| &l.name)
            .ok_or(WadError::BadLumpNum(lump))
    }

    pub fn lump_data(&self, lump: usize) -> Result<&[u8], WadError> {
        self.lumpinfo
            .get(lump)
            .map(|l| l.data.as_slice())
            .ok_or(WadError::BadLumpNum(lump))
    }

    //
    // lump_length
    // Returns the buffer size needed to load the given lump.
    //
    pub fn lump_length(&self, lump: usize) -> Result<usize, WadError> {
        self.lump_data(lump).map(<[u8]>::len)
    }
}
