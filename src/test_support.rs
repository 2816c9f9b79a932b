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
//	In-memory lump sets shared by the unit tests.
//
//-----------------------------------------------------------------------------

use std::sync::Arc;

use crate::config::RenderConfig;
use crate::defs::*;
use crate::r_data::{encode_patch, COLORMAP_SIZE, WAD_NUMCOLORMAPS};
use crate::r_main::RenderContext;
use crate::w_wad::Wad;

pub fn identity_colormap() -> Vec<u8> {
    (0..WAD_NUMCOLORMAPS * COLORMAP_SIZE)
        .map(|i| (i % COLORMAP_SIZE) as u8)
        .collect()
}

// A box of one color, one post per column.
pub fn solid_patch(width: usize, height: u8, leftoffset: i16, topoffset: i16, color: u8) -> Vec<u8> {
    let columns = vec![vec![(0u8, vec![color; height as usize])]; width];
    encode_patch(leftoffset, topoffset, height as i16, &columns)
}

// COLORMAP followed by the given lumps between S_START and S_END.
pub fn sprite_wad(lumps: &[(&str, Vec<u8>)]) -> Wad {
    let mut wad = Wad::new();
    wad.push_lump("COLORMAP", identity_colormap());
    wad.push_lump("S_START", Vec::new());
    for (name, data) in lumps {
        wad.push_lump(name, data.clone());
    }
    wad.push_lump("S_END", Vec::new());
    wad
}

pub fn render_context(wad: Wad, names: &[&str]) -> RenderContext {
    render_context_with(wad, names, &RenderConfig::default())
}

pub fn render_context_with(wad: Wad, names: &[&str], config: &RenderConfig) -> RenderContext {
    RenderContext::new(Arc::new(wad), config, names).unwrap()
}

// Viewer at the origin looking east along +x, eyes at z = 0,
//  with exact trigonometry.
pub fn face_east(rc: &mut RenderContext) {
    rc.view.viewx = 0;
    rc.view.viewy = 0;
    rc.view.viewz = 0;
    rc.view.viewangle = 0;
    rc.view.viewcos = FRACUNIT;
    rc.view.viewsin = 0;
    rc.validcount += 1;
}
