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
// Revision 1.3  1997/01/29 20:10
// DESCRIPTION:
//	Preparation of data for rendering,
//	generation of lookups, caching, retrieval by name.
//
//-----------------------------------------------------------------------------

use std::sync::Arc;

use log::{info, warn};
use thiserror::Error;

use crate::defs::*;
use crate::w_wad::{lump_name_str, Wad, WadError};

pub const COLORMAP_SIZE: usize = 256;
pub type ColormapIndex = usize;
// NUMCOLORMAPS is 32, the WAD has 34.
pub const WAD_NUMCOLORMAPS: usize = 34;
pub const TINTTAB_SIZE: usize = 256 * 256;
// one remap per non-green player color, per class
pub const NUMTRANSLATIONS: usize = (NUMCLASSES - 1) * (MAXPLAYERS - 1);

#[derive(Error, Debug)]
pub enum DataError {
    #[error(transparent)]
    Wad(#[from] WadError),

    #[error("bad patch in lump {lump}: {reason}")]
    BadPatch { lump: usize, reason: &'static str },

    #[error("bad texturecolumn {column} in lump {lump}")]
    BadColumn { lump: usize, column: i32 },

    #[error("unable to load COLORMAP (size {0}), need at least {1}")]
    ShortColormap(usize, usize),
}

//
// Graphics.
// DOOM graphics for walls and sprites
// is stored in vertical runs of opaque pixels (posts).
// A column is composed of zero or more posts,
// a patch or sprite is composed of zero or more columns.
//
// A patch starts with width, height, leftoffset and
//  topoffset as little endian shorts, followed by
//  one 32 bit column offset per column.
//
#[derive(Debug, Clone, Copy)]
pub struct Patch<'a> {
    lump: usize,
    data: &'a [u8],
}

fn read_i16(data: &[u8], ofs: usize) -> i16 {
    i16::from_le_bytes([data[ofs], data[ofs + 1]])
}

impl<'a> Patch<'a> {
    pub fn new(lump: usize, data: &'a [u8]) -> Result<Self, DataError> {
        if data.len() < 8 {
            return Err(DataError::BadPatch {
                lump,
                reason: "header too short",
            });
        }
        let patch = Patch { lump, data };
        if patch.width() < 0 {
            return Err(DataError::BadPatch {
                lump,
                reason: "negative width",
            });
        }
        if data.len() < 8 + 4 * patch.width() as usize {
            return Err(DataError::BadPatch {
                lump,
                reason: "column directory truncated",
            });
        }
        Ok(patch)
    }

    // bounding box size
    pub fn width(&self) -> i32 {
        read_i16(self.data, 0) as i32
    }

    pub fn height(&self) -> i32 {
        read_i16(self.data, 2) as i32
    }

    // pixels to the left of origin
    pub fn leftoffset(&self) -> i32 {
        read_i16(self.data, 4) as i32
    }

    // pixels below the origin
    pub fn topoffset(&self) -> i32 {
        read_i16(self.data, 6) as i32
    }

    //
    // column
    // The column data from its first post to the end of the lump.
    //
    pub fn column(&self, texturecolumn: i32) -> Result<&'a [u8], DataError> {
        if texturecolumn < 0 || texturecolumn >= self.width() {
            return Err(DataError::BadColumn {
                lump: self.lump,
                column: texturecolumn,
            });
        }
        let dir = 8 + 4 * texturecolumn as usize;
        let d = &self.data[dir..dir + 4];
        let ofs = u32::from_le_bytes([d[0], d[1], d[2], d[3]]) as usize;
        self.data.get(ofs..).ok_or(DataError::BadPatch {
            lump: self.lump,
            reason: "column offset past end of lump",
        })
    }
}

// posts are runs of non masked source pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Post<'a> {
    pub topdelta: u8,
    pub length: u8,
    // the pixels of this post and whatever follows it
    pub source: &'a [u8],
}

//
// Walks a column, a list of 0 or more posts, (byte)-1 terminated.
// A truncated column simply ends early.
//
pub struct Posts<'a> {
    column: &'a [u8],
}

pub fn posts(column: &[u8]) -> Posts<'_> {
    Posts { column }
}

impl<'a> Iterator for Posts<'a> {
    type Item = Post<'a>;

    fn next(&mut self) -> Option<Post<'a>> {
        let topdelta = *self.column.first()?;
        if topdelta == 0xff {
            return None;
        }
        let length = *self.column.get(1)?;
        let source = self.column.get(3..)?;
        let post = Post {
            topdelta,
            length,
            source,
        };
        self.column = self.column.get(length as usize + 4..).unwrap_or(&[]);
        Some(post)
    }
}

//
// encode_patch
// Builds a patch lump from columns of (topdelta, pixels) posts.
//
pub fn encode_patch(
    leftoffset: i16,
    topoffset: i16,
    height: i16,
    columns: &[Vec<(u8, Vec<u8>)>],
) -> Vec<u8> {
    let width = columns.len();
    let mut out = Vec::new();
    out.extend_from_slice(&(width as i16).to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&leftoffset.to_le_bytes());
    out.extend_from_slice(&topoffset.to_le_bytes());
    out.resize(8 + 4 * width, 0);

    for (i, column) in columns.iter().enumerate() {
        let ofs = out.len() as u32;
        out[8 + 4 * i..12 + 4 * i].copy_from_slice(&ofs.to_le_bytes());
        for (topdelta, pixels) in column {
            out.push(*topdelta);
            out.push(pixels.len() as u8);
            out.push(0);
            out.extend_from_slice(pixels);
            out.push(0);
        }
        out.push(0xff);
    }
    out
}

// Header info of a sprite lump, in fixed point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteLump {
    pub offset: Fixed,
    pub topoffset: Fixed,
    pub width: Fixed,
}

//
// Color lookups used by the column drawers.
//
#[derive(Debug, Clone)]
pub struct ColorTables {
    pub colormaps: Vec<u8>,
    pub translationtables: Vec<u8>,
    pub tinttable: Option<Vec<u8>>,
}

impl ColorTables {
    //
    // load
    // COLORMAP is required, translations and the
    //  translucency table are optional.
    //
    pub fn load(wad: &Wad) -> Result<Self, DataError> {
        // Load in the light tables
        let lump = wad.get_num_for_name("COLORMAP")?;
        let data = wad.lump_data(lump)?;
        let needed = (NUMCOLORMAPS + 1) * COLORMAP_SIZE;
        if data.len() < needed {
            return Err(DataError::ShortColormap(data.len(), needed));
        }
        let mut colormaps = data.to_vec();
        colormaps.resize(WAD_NUMCOLORMAPS * COLORMAP_SIZE, 0);

        let translationtables = Self::load_translation_tables(wad)?;

        let tinttable = match wad.check_num_for_name("TINTTAB") {
            Some(lump) => {
                let mut tint = wad.lump_data(lump)?.to_vec();
                tint.resize(TINTTAB_SIZE, 0);
                Some(tint)
            }
            None => None,
        };

        Ok(ColorTables {
            colormaps,
            translationtables,
            tinttable,
        })
    }

    //
    // load_translation_tables
    // The remaps are stored as consecutive lumps
    //  starting at TRANTBL0.
    //
    fn load_translation_tables(wad: &Wad) -> Result<Vec<u8>, DataError> {
        let mut tables = Vec::with_capacity(NUMTRANSLATIONS * 256);
        match wad.check_num_for_name("TRANTBL0") {
            Some(first) => {
                for i in 0..NUMTRANSLATIONS {
                    let data = wad.lump_data(first + i)?;
                    let mut remap = [0u8; 256];
                    for (c, v) in remap.iter_mut().zip(data) {
                        *c = *v;
                    }
                    tables.extend_from_slice(&remap);
                }
            }
            None => {
                warn!("TRANTBL0 not found, player translations are identity maps");
                for _ in 0..NUMTRANSLATIONS {
                    tables.extend((0..=255).map(|c: u32| c as u8));
                }
            }
        }
        Ok(tables)
    }

    pub fn identity() -> Self {
        let mut colormaps = Vec::with_capacity(WAD_NUMCOLORMAPS * COLORMAP_SIZE);
        for _ in 0..WAD_NUMCOLORMAPS {
            colormaps.extend((0..=255).map(|c: u32| c as u8));
        }
        let mut translationtables = Vec::with_capacity(NUMTRANSLATIONS * 256);
        for _ in 0..NUMTRANSLATIONS {
            translationtables.extend((0..=255).map(|c: u32| c as u8));
        }
        ColorTables {
            colormaps,
            translationtables,
            tinttable: None,
        }
    }
}

pub struct RenderData {
    wad: Arc<Wad>,
    pub firstspritelump: usize,
    pub lastspritelump: usize,
    pub sprite: Vec<SpriteLump>,
}

impl std::fmt::Debug for RenderData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderData")
            .field("firstspritelump", &self.firstspritelump)
            .field("lastspritelump", &self.lastspritelump)
            .field("numspritelumps", &self.sprite.len())
            .finish()
    }
}

impl RenderData {
    //
    // init
    // Locates all the lumps
    //  that will be used by all views.
    //
    pub fn init(wad: Arc<Wad>) -> Result<Self, DataError> {
        let mut rd = RenderData {
            wad,
            firstspritelump: 0,
            lastspritelump: 0,
            sprite: Vec::new(),
        };
        rd.init_sprite_lumps()?;
        info!("InitSprites: {} sprite lumps", rd.sprite.len());
        Ok(rd)
    }

    //
    // init_sprite_lumps
    // Finds the width and hoffset of all sprites in the wad,
    //  so the sprite does not need to be cached completely
    //  just for having the header info ready during rendering.
    //
    fn init_sprite_lumps(&mut self) -> Result<(), DataError> {
        self.firstspritelump = self.wad.get_num_for_name("S_START")? + 1;
        let end = self.wad.get_num_for_name("S_END")?.max(self.firstspritelump);
        // an empty range leaves lastspritelump before firstspritelump
        self.lastspritelump = end - 1;

        self.sprite.clear();
        for lump in self.firstspritelump..end {
            let patch = Patch::new(lump, self.wad.lump_data(lump)?)?;
            self.sprite.push(SpriteLump {
                width: patch.width() << FRACBITS,
                offset: patch.leftoffset() << FRACBITS,
                topoffset: patch.topoffset() << FRACBITS,
            });
        }
        Ok(())
    }

    pub fn wad(&self) -> &Wad {
        &self.wad
    }

    pub fn num_sprite_lumps(&self) -> usize {
        self.sprite.len()
    }

    //
    // sprite_patch
    // Picture of a sprite lump, numbered from the first sprite.
    //
    pub fn sprite_patch(&self, lump: usize) -> Result<Patch<'_>, DataError> {
        self.patch(self.firstspritelump + lump)
    }

    pub fn patch(&self, lumpnum: usize) -> Result<Patch<'_>, DataError> {
        Patch::new(lumpnum, self.wad.lump_data(lumpnum)?)
    }

    pub fn sprite_lump_name(&self, lump: usize) -> String {
        self.wad
            .lump_name(self.firstspritelump + lump)
            .map(|n| lump_name_str(n))
            .unwrap_or_default()
    }
}
