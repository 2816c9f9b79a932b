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
//	BSP traversal output: the drawsegs the wall pass leaves
//	 behind for sprite clipping and masked mid textures.
//
//-----------------------------------------------------------------------------

use crate::defs::*;

pub const MAXDRAWSEGS: usize = 256;
pub type DrawSegIndex = usize;

// The line a seg lies on, for point side tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SegLine {
    pub x1: Fixed,
    pub y1: Fixed,
    pub x2: Fixed,
    pub y2: Fixed,
}

//
// Where the sprite clip values of a drawseg come from.
// Solid walls clip everything and share the
//  constant arrays, others keep their values
//  in the openings buffer starting at column x1.
//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteClip {
    Opening(usize),
    NegOne,
    ScreenHeight,
}

// A masked mid texture still to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskedMid {
    // lump number of the single patch texture
    pub texture: usize,
    pub texturemid: Fixed,
    // light level of the front sector
    pub lightlevel: i16,
    // texture column per screen column in openings,
    //  starting at x1, MAXSHORT once drawn
    pub maskedtexturecol: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawSeg {
    pub curline: SegLine,
    pub x1: i32,
    pub x2: i32,

    pub scale1: Fixed,
    pub scale2: Fixed,
    pub scalestep: Fixed,

    pub silhouette: Silhouette,

    // do not clip sprites above this
    pub bsilheight: Fixed,

    // do not clip sprites below this
    pub tsilheight: Fixed,

    pub sprtopclip: Option<SpriteClip>,
    pub sprbottomclip: Option<SpriteClip>,
    pub masked: Option<MaskedMid>,
}

impl Default for DrawSeg {
    fn default() -> Self {
        DrawSeg {
            curline: SegLine::default(),
            x1: 0,
            x2: 0,
            scale1: 0,
            scale2: 0,
            scalestep: 0,
            silhouette: Silhouette::empty(),
            bsilheight: MAXINT,
            tsilheight: MININT,
            sprtopclip: None,
            sprbottomclip: None,
            masked: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct BspContext {
    pub drawsegs: Vec<DrawSeg>,
    pub openings: Vec<i16>,
    // drawsegs refused after the list filled up
    pub dropped: usize,
}

impl BspContext {
    pub fn new() -> Self {
        BspContext {
            drawsegs: Vec::with_capacity(MAXDRAWSEGS),
            openings: Vec::with_capacity(SCREENWIDTH * 64),
            dropped: 0,
        }
    }

    //
    // clear_drawsegs
    //
    pub fn clear_drawsegs(&mut self) {
        self.drawsegs.clear();
        self.openings.clear();
        self.dropped = 0;
    }

    //
    // store_drawseg
    // Don't overflow and crash.
    //
    pub fn store_drawseg(&mut self, ds: DrawSeg) -> Option<DrawSegIndex> {
        if self.drawsegs.len() >= MAXDRAWSEGS {
            self.dropped += 1;
            return None;
        }
        self.drawsegs.push(ds);
        Some(self.drawsegs.len() - 1)
    }

    //
    // alloc_openings
    // Saves a run of per column values, returns
    //  where the first one went.
    //
    pub fn alloc_openings(&mut self, values: &[i16]) -> usize {
        let start = self.openings.len();
        self.openings.extend_from_slice(values);
        start
    }

    //
    // clip_value
    // Value of a sprite clip array at screen column x.
    //
    pub fn clip_value(&self, clip: SpriteClip, ds: &DrawSeg, x: i32, viewheight: i32) -> i16 {
        match clip {
            SpriteClip::NegOne => -1,
            SpriteClip::ScreenHeight => viewheight as i16,
            SpriteClip::Opening(start) => self
                .openings
                .get(start + (x - ds.x1) as usize)
                .copied()
                .unwrap_or(-1),
        }
    }
}
