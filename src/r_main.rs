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
//	Rendering main loop and setup functions,
//	 utility functions (BSP, geometry, trigonometry).
//	See tables.rs, too.
//
//-----------------------------------------------------------------------------

use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

use crate::config::{ConfigError, RenderConfig};
use crate::defs::*;
use crate::m_fixed::fixed_mul;
use crate::r_bsp::{BspContext, SegLine};
use crate::r_data::{ColorTables, ColormapIndex, DataError, RenderData, COLORMAP_SIZE, WAD_NUMCOLORMAPS};
use crate::r_draw::VideoContext;
use crate::r_things::{SpriteCatalog, SpriteError, ThingsContext};
use crate::tables::{finecosine, finesine, slope_div, tantoangle};
use crate::w_wad::Wad;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Sprite(#[from] SpriteError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ViewContext {
    pub viewx: Fixed,
    pub viewy: Fixed,
    pub viewz: Fixed,
    pub viewangle: Angle,
    // side views from an external device, in BAM
    pub viewangleoffset: i32,
    pub viewsin: Fixed,
    pub viewcos: Fixed,
}

impl ViewContext {
    //
    // point_to_angle
    // Angle from the viewer to a map point.
    //
    pub fn point_to_angle(&self, x: Fixed, y: Fixed) -> Angle {
        point_to_angle2(self.viewx, self.viewy, x, y)
    }
}

#[derive(Debug)]
pub struct RenderContext {
    pub view: ViewContext,
    pub vc: VideoContext,
    pub rd: RenderData,
    pub bc: BspContext,
    pub tc: ThingsContext,

    pub detailshift: i32,
    pub centerx: i32,
    pub centery: i32,
    pub centerxfrac: Fixed,
    pub centeryfrac: Fixed,
    pub projection: Fixed,

    pub viewwidth: i32,
    pub scaledviewwidth: i32,
    pub viewheight: i32,
    pub screenblocks: i32,

    pub scalelight: [[ColormapIndex; MAXLIGHTSCALE]; LIGHTLEVELS],
    pub fixedcolormap: Option<ColormapIndex>,
    pub extralight: i32,

    // the player whose view is being drawn
    pub viewplayer: Player,
    // light level of the sector the view player stands in
    pub viewlightlevel: i16,

    pub validcount: i32,
    pub framecount: i32,

    setsizeneeded: bool,
    setblocks: i32,
    setdetail: i32,
}

//
// point_on_side_common
// Traverse BSP (sub) tree,
//  check point against partition plane.
// Returns side 0 (front) or 1 (back).
//
fn point_on_side_common(x: Fixed, y: Fixed,
                        lx: Fixed, ly: Fixed,
                        ldx: Fixed, ldy: Fixed) -> i32 {
    if ldx == 0 {
        if x <= lx {
            return if ldy > 0 { 1 } else { 0 };
        }
        return if ldy < 0 { 1 } else { 0 };
    }
    if ldy == 0 {
        if y <= ly {
            return if ldx < 0 { 1 } else { 0 };
        }
        return if ldx > 0 { 1 } else { 0 };
    }

    let dx = x.wrapping_sub(lx);
    let dy = y.wrapping_sub(ly);

    // Try to quickly decide by looking at sign bits.
    if ((ldy ^ ldx ^ dx ^ dy) as u32) & 0x8000_0000 != 0 {
        if ((ldy ^ dx) as u32) & 0x8000_0000 != 0 {
            // (left is negative)
            return 1;
        }
        return 0;
    }

    let left = fixed_mul(ldy >> FRACBITS, dx);
    let right = fixed_mul(dy, ldx >> FRACBITS);

    if right < left {
        // front side
        return 0;
    }
    // back side
    1
}

pub fn point_on_seg_side(x: Fixed, y: Fixed, line: &SegLine) -> i32 {
    let ldx = line.x2.wrapping_sub(line.x1);
    let ldy = line.y2.wrapping_sub(line.y1);
    point_on_side_common(x, y, line.x1, line.y1, ldx, ldy)
}

//
// point_to_angle
// To get a global angle from cartesian coordinates,
//  the coordinates are flipped until they are in
//  the first octant of the coordinate system, then
//  the y (<=x) is scaled and divided by x to get a
//  tangent (slope) value which is looked up in the
//  tantoangle[] table.
//
fn point_to_angle_common(x: Fixed, y: Fixed) -> Angle {
    if x == 0 && y == 0 {
        return 0;
    }

    if x >= 0 {
        // x >=0
        if y >= 0 {
            // y>= 0
            if x > y {
                // octant 0
                tantoangle(slope_div(y as u32, x as u32))
            } else {
                // octant 1
                (ANG90 - 1).wrapping_sub(tantoangle(slope_div(x as u32, y as u32)))
            }
        } else {
            // y<0
            let y = y.wrapping_neg();

            if x > y {
                // octant 8
                0u32.wrapping_sub(tantoangle(slope_div(y as u32, x as u32)))
            } else {
                // octant 7
                ANG270.wrapping_add(tantoangle(slope_div(x as u32, y as u32)))
            }
        }
    } else {
        // x<0
        let x = x.wrapping_neg();

        if y >= 0 {
            // y>= 0
            if x > y {
                // octant 3
                (ANG180 - 1).wrapping_sub(tantoangle(slope_div(y as u32, x as u32)))
            } else {
                // octant 2
                ANG90.wrapping_add(tantoangle(slope_div(x as u32, y as u32)))
            }
        } else {
            // y<0
            let y = y.wrapping_neg();

            if x > y {
                // octant 4
                ANG180.wrapping_add(tantoangle(slope_div(y as u32, x as u32)))
            } else {
                // octant 5
                (ANG270 - 1).wrapping_sub(tantoangle(slope_div(x as u32, y as u32)))
            }
        }
    }
}

pub fn point_to_angle2(x1: Fixed, y1: Fixed, x2: Fixed, y2: Fixed) -> Angle {
    point_to_angle_common(x2.wrapping_sub(x1), y2.wrapping_sub(y1))
}

//
// Light tables.
//
const DISTMAP: i32 = 2;

impl RenderContext {
    //
    // new
    // Loads the color tables and sprite lumps, builds
    //  the sprite catalog and sets the initial view size.
    //
    pub fn new(wad: Arc<Wad>, config: &RenderConfig, namelist: &[&str])
            -> Result<Self, RenderError> {
        config.validate()?;

        let tables = ColorTables::load(&wad)?;
        info!("R_InitData");
        let rd = RenderData::init(wad)?;
        let sprites = SpriteCatalog::init_sprite_defs(&rd, namelist, config.shareware)?;
        info!("R_InitSprites: {} sprite definitions", sprites.num_sprites());

        let mut rc = RenderContext {
            view: ViewContext::default(),
            vc: VideoContext::new(tables),
            rd,
            bc: BspContext::new(),
            tc: ThingsContext::new(sprites, config),
            detailshift: 0,
            centerx: 0,
            centery: 0,
            centerxfrac: 0,
            centeryfrac: 0,
            projection: 0,
            viewwidth: 0,
            scaledviewwidth: 0,
            viewheight: 0,
            screenblocks: config.screenblocks,
            scalelight: [[0; MAXLIGHTSCALE]; LIGHTLEVELS],
            fixedcolormap: None,
            extralight: 0,
            viewplayer: Player::default(),
            viewlightlevel: 0,
            validcount: 0,
            framecount: 0,
            setsizeneeded: false,
            setblocks: 0,
            setdetail: 0,
        };

        rc.set_view_size(config.screenblocks, config.detail);
        rc.execute_set_view_size();
        Ok(rc)
    }

    //
    // set_view_size
    // Do not really change anything here,
    //  because it might be in the middle of a refresh.
    // The change will take effect next refresh.
    //
    pub fn set_view_size(&mut self, blocks: i32, detail: i32) {
        self.setsizeneeded = true;
        self.setblocks = blocks.clamp(3, 11);
        self.setdetail = detail.clamp(0, 1);
    }

    pub fn set_size_needed(&self) -> bool {
        self.setsizeneeded
    }

    //
    // execute_set_view_size
    //
    pub fn execute_set_view_size(&mut self) {
        self.setsizeneeded = false;

        if self.setblocks == 11 {
            self.scaledviewwidth = SCREENWIDTH as i32;
            self.viewheight = SCREENHEIGHT as i32;
        } else {
            self.scaledviewwidth = self.setblocks * 32;
            self.viewheight = (self.setblocks * 161 / 10) & !7;
        }
        self.screenblocks = self.setblocks;

        self.detailshift = self.setdetail;
        self.viewwidth = self.scaledviewwidth >> self.detailshift;

        self.centery = self.viewheight / 2;
        self.centerx = self.viewwidth / 2;
        self.centerxfrac = self.centerx << FRACBITS;
        self.centeryfrac = self.centery << FRACBITS;
        self.projection = self.centerxfrac;

        self.vc.detailshift = self.detailshift;
        self.vc.init_buffer(self.scaledviewwidth, self.viewheight);
        self.vc.centery = self.centery;

        // psprite scales, thing clipping
        self.tc.resize(self.viewwidth, self.viewheight);

        // Calculate the light levels to use
        //  for each level / scale combination.
        for (i, row) in self.scalelight.iter_mut().enumerate() {
            let startmap = (((LIGHTLEVELS - 1 - i) * 2) * NUMCOLORMAPS / LIGHTLEVELS) as i32;
            for (j, slot) in row.iter_mut().enumerate() {
                let level = startmap
                    - ((j as i32 * SCREENWIDTH as i32) / (self.viewwidth << self.detailshift))
                        / DISTMAP;
                let level = level.clamp(0, NUMCOLORMAPS as i32 - 1);
                *slot = level as usize * COLORMAP_SIZE;
            }
        }

        debug!(
            "view size {}x{} (detail {})",
            self.scaledviewwidth, self.viewheight, self.detailshift
        );
    }

    //
    // setup_frame
    //
    pub fn setup_frame(&mut self, player: &Player, sectors: &[Sector]) {
        self.viewplayer = player.clone();
        self.view.viewx = player.mo.x;
        self.view.viewy = player.mo.y;
        self.view.viewangle = player.mo.angle.wrapping_add(self.view.viewangleoffset as u32);
        self.extralight = player.extralight;
        self.view.viewz = player.viewz;

        let fine = (self.view.viewangle >> ANGLETOFINESHIFT) as usize;
        self.view.viewsin = finesine(fine);
        self.view.viewcos = finecosine(fine);

        self.fixedcolormap = if player.fixedcolormap != 0 {
            let map = (player.fixedcolormap as usize).min(WAD_NUMCOLORMAPS - 1);
            Some(map * COLORMAP_SIZE)
        } else {
            None
        };

        // look up/down
        self.centery = self.viewheight / 2 + player.lookdir * self.screenblocks / 10;
        self.centeryfrac = self.centery << FRACBITS;
        self.vc.centery = self.centery;

        self.viewlightlevel = sectors
            .get(player.mo.sector)
            .map_or(0, |sec| sec.lightlevel);

        self.framecount += 1;
        self.validcount += 1;
    }

    //
    // clear_frame
    // Applies a pending view size change, then empties
    //  the occlusion list and the vissprite pool.
    //
    pub fn clear_frame(&mut self) {
        if self.setsizeneeded {
            self.execute_set_view_size();
        }
        self.bc.clear_drawsegs();
        self.tc.clear_sprites();
    }
}
