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
// Refresh of things, i.e. objects represented by sprites.
//
//-----------------------------------------------------------------------------

use log::{debug, warn};
use thiserror::Error;

use crate::config::RenderConfig;
use crate::defs::*;
use crate::m_fixed::{fixed_div, fixed_mul};
use crate::r_data::{posts, ColormapIndex, RenderData, COLORMAP_SIZE};
use crate::r_draw::{ColumnFunc, DrawColumnParams, VideoContext};
use crate::r_main::{point_on_seg_side, RenderContext, RenderError};
use crate::r_segs::render_masked_seg_range;
use crate::w_wad::{lump_name_str, name8};

pub const MAXVISSPRITES: usize = 128;
pub const MAXSPRITEFRAMES: usize = 30;

const MINZ: Fixed = FRACUNIT * 4;

// Overlays are not drawn once the view is turned
//  further than this to either side.
const PSPRITE_SIDEVIEW_LIMIT: u32 = 1024 << ANGLETOFINESHIFT;

// Y-adjustment values for full screen (4 weapons)
const PSPRITE_SY: [[Fixed; NUMWEAPONS]; NUMCLASSES] = [
    [0, -12 * FRACUNIT, -10 * FRACUNIT, 10 * FRACUNIT],             // Fighter
    [-8 * FRACUNIT, 10 * FRACUNIT, 10 * FRACUNIT, 0],               // Cleric
    [9 * FRACUNIT, 20 * FRACUNIT, 20 * FRACUNIT, 20 * FRACUNIT],    // Mage
    [10 * FRACUNIT, 10 * FRACUNIT, 10 * FRACUNIT, 10 * FRACUNIT],   // Pig
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpriteError {
    #[error("R_InstallSpriteLump: Bad frame characters in lump {0}")]
    BadFrameCharacters(String),

    #[error("R_InitSprites: Sprite {sprite} frame {frame} has multiple rot=0 lump")]
    MultipleRot0 { sprite: String, frame: char },

    #[error("R_InitSprites: Sprite {sprite} frame {frame} has rotations and a rot=0 lump")]
    MixedRotations { sprite: String, frame: char },

    #[error("R_InitSprites: Sprite {sprite} : {frame} : {rotation} has two lumps mapped to it")]
    DuplicateLump { sprite: String, frame: char, rotation: char },

    #[error("R_InitSprites: No patches found for {sprite} frame {frame}")]
    MissingFrame { sprite: String, frame: char },

    #[error("R_InitSprites: Sprite {sprite} frame {frame} is missing rotations")]
    MissingRotations { sprite: String, frame: char },

    #[error("R_InitSprites: No lumps found for sprite {0}")]
    NoLumps(String),

    #[error("R_ProjectSprite: invalid sprite number {0}")]
    InvalidSprite(usize),

    #[error("R_ProjectSprite: invalid sprite frame {sprite} : {frame}")]
    InvalidFrame { sprite: usize, frame: u32 },
}

//
// Sprites are patches with a special naming convention
//  so they can be recognized by init_sprite_defs.
// The base name is NNNNFx or NNNNFxFx, with
//  x indicating the rotation, x = 0, 1-7.
// The sprite and frame specified by a thing
//  is range checked at run time.
// A sprite is a patch with a special naming convention
//  so it can be recognized by init_sprite_defs.
//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteFrame {
    // If false use 0 for any position.
    pub rotate: bool,

    // Lump to use for view angles 0-7,
    //  numbered from the first sprite lump.
    pub lump: [usize; 8],

    // Flip bit (true = flip) to use for view angles 0-7.
    pub flip: [bool; 8],
}

//
// A sprite definition:
//  a number of animation frames.
//
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteDef {
    pub name: String,
    pub frames: Vec<SpriteFrame>,
}

impl SpriteDef {
    pub fn numframes(&self) -> usize {
        self.frames.len()
    }
}

// A frame while the lumps are being scanned.
#[derive(Debug, Default, Clone, Copy)]
struct TempFrame {
    rotate: Option<bool>,
    lump: [Option<usize>; 8],
    flip: [bool; 8],
}

struct SpriteBuilder<'a> {
    spritename: &'a str,
    sprtemp: [TempFrame; MAXSPRITEFRAMES],
    maxframe: Option<usize>,
}

fn frame_char(frame: usize) -> char {
    (b'A' + frame as u8) as char
}

impl<'a> SpriteBuilder<'a> {
    fn new(spritename: &'a str) -> Self {
        SpriteBuilder {
            spritename,
            sprtemp: [TempFrame::default(); MAXSPRITEFRAMES],
            maxframe: None,
        }
    }

    //
    // install_sprite_lump
    // Local function for init_sprite_defs.
    //
    fn install_sprite_lump(&mut self, lumpname: &[u8; 8], lump: usize,
                           framech: u8, rotationch: u8, flipped: bool)
            -> Result<(), SpriteError> {
        let frame = framech.wrapping_sub(b'A') as usize;
        let rotation = rotationch.wrapping_sub(b'0') as usize;

        if frame >= MAXSPRITEFRAMES || rotation > 8 {
            return Err(SpriteError::BadFrameCharacters(lump_name_str(lumpname)));
        }

        self.maxframe = Some(self.maxframe.map_or(frame, |m| m.max(frame)));

        let sprite = self.spritename;
        let sprtemp = &mut self.sprtemp[frame];

        if rotation == 0 {
            // the lump should be used for all rotations
            match sprtemp.rotate {
                Some(false) => {
                    return Err(SpriteError::MultipleRot0 {
                        sprite: sprite.to_string(),
                        frame: frame_char(frame),
                    });
                }
                Some(true) => {
                    return Err(SpriteError::MixedRotations {
                        sprite: sprite.to_string(),
                        frame: frame_char(frame),
                    });
                }
                None => {}
            }

            sprtemp.rotate = Some(false);
            sprtemp.lump = [Some(lump); 8];
            sprtemp.flip = [flipped; 8];
            return Ok(());
        }

        // the lump is only used for one rotation
        if sprtemp.rotate == Some(false) {
            return Err(SpriteError::MixedRotations {
                sprite: sprite.to_string(),
                frame: frame_char(frame),
            });
        }

        sprtemp.rotate = Some(true);

        // make 0 based
        let rotation = rotation - 1;
        if sprtemp.lump[rotation].is_some() {
            return Err(SpriteError::DuplicateLump {
                sprite: sprite.to_string(),
                frame: frame_char(frame),
                rotation: (b'1' + rotation as u8) as char,
            });
        }

        sprtemp.lump[rotation] = Some(lump);
        sprtemp.flip[rotation] = flipped;
        Ok(())
    }

    //
    // finish
    // Checks the frames that were found for completeness.
    //
    fn finish(self) -> Result<Vec<SpriteFrame>, SpriteError> {
        let Some(maxframe) = self.maxframe else {
            return Ok(Vec::new());
        };

        let mut frames = Vec::with_capacity(maxframe + 1);
        for (frame, sprtemp) in self.sprtemp[..=maxframe].iter().enumerate() {
            let rotate = match sprtemp.rotate {
                None => {
                    // no rotations were found for that frame at all
                    return Err(SpriteError::MissingFrame {
                        sprite: self.spritename.to_string(),
                        frame: frame_char(frame),
                    });
                }
                // only the first rotation is needed
                Some(false) => false,
                Some(true) => {
                    // must have all 8 frames
                    if sprtemp.lump.iter().any(Option::is_none) {
                        return Err(SpriteError::MissingRotations {
                            sprite: self.spritename.to_string(),
                            frame: frame_char(frame),
                        });
                    }
                    true
                }
            };

            frames.push(SpriteFrame {
                rotate,
                lump: sprtemp.lump.map(|l| l.unwrap_or(0)),
                flip: sprtemp.flip,
            });
        }
        Ok(frames)
    }
}

//
// The sprite definitions for every name the game uses,
//  built once and never changed afterwards.
//
#[derive(Debug, Default, Clone)]
pub struct SpriteCatalog {
    sprites: Vec<SpriteDef>,
}

impl SpriteCatalog {
    //
    // init_sprite_defs
    // Pass a list of sprite names
    //  (4 chars exactly) to be used.
    // Builds the sprite rotation matrixes to account
    //  for horizontally flipped sprites.
    // Will report an error if the lumps are inconsistant.
    // Only called at startup.
    //
    // Sprite lump names are 4 characters for the actor,
    //  a letter for the frame, and a number for the rotation.
    // A sprite that is flippable will have an additional
    //  letter/number appended.
    // The rotation character can be 0 to signify no rotations.
    //
    pub fn init_sprite_defs(rd: &RenderData, namelist: &[&str], shareware: bool)
            -> Result<Self, SpriteError> {
        let mut sprites = Vec::with_capacity(namelist.len());

        for &spritename in namelist {
            let intname = name8(spritename);
            let mut builder = SpriteBuilder::new(spritename);

            // scan the lumps,
            //  filling in the frames for whatever is found
            for l in 0..rd.num_sprite_lumps() {
                let Ok(lumpname) = rd.wad().lump_name(rd.firstspritelump + l) else {
                    continue;
                };
                if lumpname[..4] != intname[..4] {
                    continue;
                }

                builder.install_sprite_lump(lumpname, l, lumpname[4], lumpname[5], false)?;

                if lumpname[6] != 0 {
                    builder.install_sprite_lump(lumpname, l, lumpname[6], lumpname[7], true)?;
                }
            }

            if builder.maxframe.is_none() {
                if !shareware {
                    return Err(SpriteError::NoLumps(spritename.to_string()));
                }
                warn!("R_InitSprites: No lumps found for sprite {}", spritename);
            }

            sprites.push(SpriteDef {
                name: spritename.to_string(),
                frames: builder.finish()?,
            });
        }

        Ok(SpriteCatalog { sprites })
    }

    pub fn num_sprites(&self) -> usize {
        self.sprites.len()
    }

    pub fn sprite(&self, sprite: usize) -> Option<&SpriteDef> {
        self.sprites.get(sprite)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpriteDef> {
        self.sprites.iter()
    }

    //
    // frame
    // Decide which frame of a sprite to use,
    //  the full bright bit is ignored.
    //
    pub fn frame(&self, sprite: usize, frame: u32) -> Result<&SpriteFrame, SpriteError> {
        let sprdef = self
            .sprites
            .get(sprite)
            .ok_or(SpriteError::InvalidSprite(sprite))?;
        sprdef
            .frames
            .get((frame & FF_FRAMEMASK) as usize)
            .ok_or(SpriteError::InvalidFrame { sprite, frame })
    }
}

// A VisSprite is a thing
//  that will be drawn during a refresh.
// I.e. a sprite object that is partly visible.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VisSprite {
    pub x1: i32,
    pub x2: i32,

    // for line side calculation
    pub gx: Fixed,
    pub gy: Fixed,

    // global bottom / top for silhouette clipping
    pub gz: Fixed,
    pub gzt: Fixed,

    // horizontal position of x1
    pub startfrac: Fixed,

    pub scale: Fixed,

    // negative if flipped
    pub xiscale: Fixed,

    pub texturemid: Fixed,
    pub patch: usize,

    // for color translation and shadow draw,
    //  maxbright frames as well
    pub colormap: ColormapIndex,

    pub mobjflags: MobjFlags,
    // true if this is a player weapon
    pub psprite: bool,
    // palette translation block
    pub playerclass: usize,
    pub floorclip: Fixed,
}

//
// The vissprites of one frame.
// Once full, new sprites all go to a single overflow
//  slot that is never drawn.
//
#[derive(Debug)]
pub struct VisSpritePool {
    vissprites: Vec<VisSprite>,
    capacity: usize,
    overflowsprite: VisSprite,
    dropped: usize,
    sorted: Vec<usize>,
}

impl VisSpritePool {
    pub fn new(capacity: usize) -> Self {
        VisSpritePool {
            vissprites: Vec::with_capacity(capacity),
            capacity,
            overflowsprite: VisSprite::default(),
            dropped: 0,
            sorted: Vec::with_capacity(capacity),
        }
    }

    //
    // clear_sprites
    // Called at frame start.
    //
    pub fn clear_sprites(&mut self) {
        self.vissprites.clear();
        self.sorted.clear();
        self.dropped = 0;
    }

    //
    // new_vissprite
    //
    pub fn new_vissprite(&mut self) -> &mut VisSprite {
        if self.vissprites.len() >= self.capacity {
            self.dropped += 1;
            return &mut self.overflowsprite;
        }

        let index = self.vissprites.len();
        self.vissprites.push(VisSprite::default());
        &mut self.vissprites[index]
    }

    pub fn len(&self) -> usize {
        self.vissprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vissprites.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // sprites sent to the overflow slot this frame
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn overflow(&self) -> &VisSprite {
        &self.overflowsprite
    }

    pub fn get(&self, index: usize) -> Option<&VisSprite> {
        self.vissprites.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VisSprite> {
        self.vissprites.iter()
    }

    //
    // sort_vis_sprites
    // Back to front: ascending scale, sprites of
    //  equal scale stay in the order they were added.
    //
    pub fn sort_vis_sprites(&mut self) -> &[usize] {
        let vissprites = &self.vissprites;
        self.sorted.clear();
        self.sorted.extend(0..vissprites.len());
        self.sorted.sort_by_key(|&i| vissprites[i].scale);
        &self.sorted
    }

    pub fn sorted(&self) -> &[usize] {
        &self.sorted
    }
}

#[derive(Debug)]
pub struct ThingsContext {
    pub sprites: SpriteCatalog,
    pub vissprites: VisSpritePool,

    pub negonearray: Vec<i16>,
    pub screenheightarray: Vec<i16>,
    // clip envelope of the sprite being drawn
    pub clipbot: Vec<i16>,
    pub cliptop: Vec<i16>,

    pub pspritescale: Fixed,
    pub pspriteiscale: Fixed,

    // scalelight row for the sector being added
    pub spritelights: usize,

    pub level_use_full_bright: bool,

    // translated things with a class out of range this frame
    pub badclasses: usize,
}

impl ThingsContext {
    pub fn new(sprites: SpriteCatalog, config: &RenderConfig) -> Self {
        ThingsContext {
            sprites,
            vissprites: VisSpritePool::new(config.max_vissprites),
            negonearray: Vec::new(),
            screenheightarray: Vec::new(),
            clipbot: Vec::new(),
            cliptop: Vec::new(),
            pspritescale: FRACUNIT,
            pspriteiscale: FRACUNIT,
            spritelights: 0,
            level_use_full_bright: config.level_use_full_bright,
            badclasses: 0,
        }
    }

    //
    // resize
    // Called when the view size changes.
    //
    pub fn resize(&mut self, viewwidth: i32, viewheight: i32) {
        let viewwidth = viewwidth.max(1);

        // psprite scales
        self.pspritescale = (FRACUNIT * viewwidth) / SCREENWIDTH as i32;
        self.pspriteiscale = (FRACUNIT * SCREENWIDTH as i32) / viewwidth;

        // thing clipping
        let width = viewwidth as usize;
        self.negonearray = vec![-1; width];
        self.screenheightarray = vec![viewheight as i16; width];
        self.clipbot = vec![-2; width];
        self.cliptop = vec![-2; width];
    }

    pub fn clear_sprites(&mut self) {
        self.vissprites.clear_sprites();
        self.badclasses = 0;
    }
}

// Bad sprite and frame numbers end the frame when range
//  checking is compiled in, otherwise the thing is skipped.
fn range_error(err: SpriteError) -> Result<(), RenderError> {
    if cfg!(feature = "rangecheck") {
        return Err(err.into());
    }
    warn!("{}", err);
    Ok(())
}

//
// One column of a masked patch, with the clip rows
//  that apply to it.
//
#[derive(Debug, Default, Clone, Copy)]
pub struct MaskedColumn {
    pub dc: DrawColumnParams,
    pub sprtopscreen: Fixed,
    pub spryscale: Fixed,
    pub floorclip: i16,
    pub ceilingclip: i16,
    // lowest row left after foot clipping
    pub baseclip: Option<i32>,
}

//
// draw_masked_column
// Used for sprites and masked mid textures.
// Masked means: partly transparent, i.e. stored
//  in posts/runs of opaque pixels.
//
pub fn draw_masked_column(vc: &mut VideoContext, func: ColumnFunc,
                          dmc: &MaskedColumn, column: &[u8]) {
    for post in posts(column) {
        // calculate unclipped screen coordinates
        //  for post
        let topscreen = dmc
            .sprtopscreen
            .wrapping_add(dmc.spryscale.wrapping_mul(post.topdelta as i32));
        let bottomscreen = topscreen.wrapping_add(dmc.spryscale.wrapping_mul(post.length as i32));

        let mut yl = topscreen.wrapping_add(FRACUNIT - 1) >> FRACBITS;
        let mut yh = bottomscreen.wrapping_sub(1) >> FRACBITS;

        if yh >= dmc.floorclip as i32 {
            yh = dmc.floorclip as i32 - 1;
        }
        if yl <= dmc.ceilingclip as i32 {
            yl = dmc.ceilingclip as i32 + 1;
        }
        if let Some(baseclip) = dmc.baseclip {
            yh = yh.min(baseclip);
        }

        if yl <= yh {
            let dc = DrawColumnParams {
                yl,
                yh,
                texturemid: dmc
                    .dc
                    .texturemid
                    .wrapping_sub((post.topdelta as i32) << FRACBITS),
                ..dmc.dc
            };
            vc.draw_column(func, &dc, post.source);
        }
    }
}

fn translation_offset(vis: &VisSprite) -> usize {
    let color = ((vis.mobjflags & MobjFlags::TRANSLATION).bits() >> (MF_TRANSSHIFT - 8)) as usize;
    (vis.playerclass * (MAXPLAYERS - 1) * COLORMAP_SIZE + color).saturating_sub(COLORMAP_SIZE)
}

//
// draw_vis_sprite
// mfloorclip and mceilingclip hold the clip rows
//  for every view column the sprite covers.
//
pub fn draw_vis_sprite(vc: &mut VideoContext, rd: &RenderData, vis: &VisSprite,
                       mfloorclip: &[i16], mceilingclip: &[i16]) -> Result<(), RenderError> {
    let patch = rd.sprite_patch(vis.patch)?;
    let func = ColumnFunc::for_flags(vis.mobjflags);

    let mut dmc = MaskedColumn {
        dc: DrawColumnParams {
            colormap: vis.colormap,
            iscale: vis.xiscale.wrapping_abs() >> vc.detailshift,
            texturemid: vis.texturemid,
            translation: if vis.mobjflags.intersects(MobjFlags::TRANSLATION) {
                translation_offset(vis)
            } else {
                0
            },
            ..DrawColumnParams::default()
        },
        spryscale: vis.scale,
        ..MaskedColumn::default()
    };

    dmc.sprtopscreen = (vc.centery << FRACBITS).wrapping_sub(fixed_mul(dmc.dc.texturemid, dmc.spryscale));

    // check to see if vissprite is a weapon
    if vis.psprite {
        let shift = vc.centery - vc.viewheight / 2;
        dmc.dc.texturemid = dmc.dc.texturemid.wrapping_add(fixed_mul(shift << FRACBITS, vis.xiscale));
        dmc.sprtopscreen = dmc.sprtopscreen.wrapping_sub(shift << FRACBITS);
    }

    // foot clipping
    if vis.floorclip != 0 && !vis.psprite {
        let sprbotscreen = dmc
            .sprtopscreen
            .wrapping_add(fixed_mul(patch.height() << FRACBITS, dmc.spryscale));
        dmc.baseclip = Some(sprbotscreen.wrapping_sub(fixed_mul(vis.floorclip, dmc.spryscale)) >> FRACBITS);
    }

    let mut frac = vis.startfrac;
    for x in vis.x1..=vis.x2 {
        let texturecolumn = frac >> FRACBITS;
        frac = frac.wrapping_add(vis.xiscale);

        let column = match patch.column(texturecolumn) {
            Ok(column) => column,
            Err(err) if cfg!(feature = "rangecheck") => return Err(err.into()),
            Err(err) => {
                warn!("R_DrawSpriteRange: {}", err);
                continue;
            }
        };

        dmc.dc.x = x;
        dmc.floorclip = mfloorclip
            .get(x as usize)
            .copied()
            .unwrap_or(vc.viewheight as i16);
        dmc.ceilingclip = mceilingclip.get(x as usize).copied().unwrap_or(-1);
        draw_masked_column(vc, func, &dmc, column);
    }
    Ok(())
}

//
// project_sprite
// Generates a vissprite for a thing
//  if it might be visible.
//
pub fn project_sprite(rc: &mut RenderContext, thing: &Mobj) -> Result<(), RenderError> {
    // Never make a vissprite when DONTDRAW is flagged.
    if thing.flags2.contains(MobjFlags2::DONTDRAW) {
        return Ok(());
    }

    // transform the origin point
    let tr_x = thing.x.wrapping_sub(rc.view.viewx);
    let tr_y = thing.y.wrapping_sub(rc.view.viewy);

    let gxt = fixed_mul(tr_x, rc.view.viewcos);
    let gyt = fixed_mul(tr_y, rc.view.viewsin).wrapping_neg();

    let tz = gxt.wrapping_sub(gyt);

    // thing is behind view plane?
    if tz < MINZ {
        return Ok(());
    }

    let xscale = fixed_div(rc.projection, tz);

    let gxt = fixed_mul(tr_x, rc.view.viewsin).wrapping_neg();
    let gyt = fixed_mul(tr_y, rc.view.viewcos);
    let mut tx = gyt.wrapping_add(gxt).wrapping_neg();

    // too far off the side?
    if tx.wrapping_abs() > (tz << 2) {
        return Ok(());
    }

    // decide which patch to use for sprite relative to player
    let sprframe = match rc.tc.sprites.frame(thing.sprite, thing.frame) {
        Ok(sprframe) => *sprframe,
        Err(err) => return range_error(err),
    };

    let (lump, flip) = if sprframe.rotate {
        // choose a different rotation based on player view
        let ang = rc.view.point_to_angle(thing.x, thing.y);
        let rot = (ang.wrapping_sub(thing.angle).wrapping_add((ANG45 / 2) * 9) >> 29) as usize;
        (sprframe.lump[rot], sprframe.flip[rot])
    } else {
        // use single rotation for all views
        (sprframe.lump[0], sprframe.flip[0])
    };
    let spritelump = rc.rd.sprite[lump];

    // calculate edges of the shape
    tx = tx.wrapping_sub(spritelump.offset);
    let x1 = rc.centerxfrac.wrapping_add(fixed_mul(tx, xscale)) >> FRACBITS;

    // off the right side?
    if x1 >= rc.viewwidth {
        return Ok(());
    }

    tx = tx.wrapping_add(spritelump.width);
    let x2 = (rc.centerxfrac.wrapping_add(fixed_mul(tx, xscale)) >> FRACBITS) - 1;

    // off the left side, or narrower than a column
    if x2 < 0 || x2 < x1 {
        return Ok(());
    }

    let mut playerclass = 0;
    if thing.flags.intersects(MobjFlags::TRANSLATION) {
        let class = match thing.player_class {
            Some(class) => class.index() as i32,
            None => thing.special1,
        };
        if (0..=2).contains(&class) {
            playerclass = class as usize;
        } else {
            // reported once a frame, the rest are only counted
            if rc.tc.badclasses == 0 {
                warn!("R_ProjectSprite: translation class {} out of range, using 0", class);
            }
            rc.tc.badclasses += 1;
        }
    }

    // store information in a vissprite
    let mut vis = VisSprite {
        mobjflags: thing.flags,
        psprite: false,
        scale: xscale << rc.detailshift,
        gx: thing.x,
        gy: thing.y,
        gz: thing.z,
        gzt: thing.z.wrapping_add(spritelump.topoffset),
        playerclass,
        // foot clipping
        floorclip: thing.floorclip,
        x1: x1.max(0),
        x2: x2.min(rc.viewwidth - 1),
        patch: lump,
        ..VisSprite::default()
    };
    vis.texturemid = vis.gzt.wrapping_sub(rc.view.viewz).wrapping_sub(vis.floorclip);

    let iscale = fixed_div(FRACUNIT, xscale);

    if flip {
        vis.startfrac = spritelump.width - 1;
        vis.xiscale = -iscale;
    } else {
        vis.startfrac = 0;
        vis.xiscale = iscale;
    }

    if vis.x1 > x1 {
        vis.startfrac = vis.startfrac.wrapping_add(vis.xiscale.wrapping_mul(vis.x1 - x1));
    }

    // get light level
    vis.colormap = if let Some(fixed) = rc.fixedcolormap {
        // fixed map
        fixed
    } else if rc.tc.level_use_full_bright && thing.frame & FF_FULLBRIGHT != 0 {
        // full bright
        0
    } else {
        // diminished light
        let index = (xscale >> (LIGHTSCALESHIFT - rc.detailshift)).clamp(0, MAXLIGHTSCALE as i32 - 1);
        rc.scalelight[rc.tc.spritelights][index as usize]
    };

    *rc.tc.vissprites.new_vissprite() = vis;
    Ok(())
}

//
// add_sprites
// During BSP traversal, this adds sprites by sector.
//
pub fn add_sprites(rc: &mut RenderContext, sec: &mut Sector, things: &[Mobj])
        -> Result<(), RenderError> {
    // BSP is traversed by subsector.
    // A sector might have been split into several
    //  subsectors during BSP building.
    // Thus we check whether its already added.
    if sec.validcount == rc.validcount {
        return Ok(());
    }

    // Well, now it will be done.
    sec.validcount = rc.validcount;

    let lightnum = ((sec.lightlevel as i32) >> LIGHTSEGSHIFT) + rc.extralight;
    rc.tc.spritelights = lightnum.clamp(0, LIGHTLEVELS as i32 - 1) as usize;

    // Handle all things in sector.
    for &index in &sec.thinglist {
        if let Some(thing) = things.get(index) {
            project_sprite(rc, thing)?;
        }
    }
    Ok(())
}

//
// project_psprite
// Places a weapon overlay in screen space.
// Returns None when it is entirely off the view.
//
pub fn project_psprite(rc: &RenderContext, psp: &PspDef, state: PspState)
        -> Result<Option<VisSprite>, RenderError> {
    // decide which patch to use
    let sprframe = match rc.tc.sprites.frame(state.sprite, state.frame) {
        Ok(sprframe) => *sprframe,
        Err(err) => return range_error(err).map(|_| None),
    };

    let lump = sprframe.lump[0];
    let flip = sprframe.flip[0];
    let spritelump = rc.rd.sprite[lump];

    // calculate edges of the shape
    let mut tx = psp.sx.wrapping_sub(160 * FRACUNIT);
    tx = tx.wrapping_sub(spritelump.offset);

    let tempangle = if rc.view.viewangleoffset != 0 {
        (rc.centerxfrac / 1024).wrapping_mul(rc.view.viewangleoffset >> ANGLETOFINESHIFT)
    } else {
        0
    };

    let x1 = rc
        .centerxfrac
        .wrapping_add(fixed_mul(tx, rc.tc.pspritescale))
        .wrapping_add(tempangle)
        >> FRACBITS;

    // off the right side
    if x1 >= rc.viewwidth {
        return Ok(None);
    }

    tx = tx.wrapping_add(spritelump.width);
    let x2 = (rc
        .centerxfrac
        .wrapping_add(fixed_mul(tx, rc.tc.pspritescale))
        .wrapping_add(tempangle)
        >> FRACBITS)
        - 1;

    // off the left side
    if x2 < 0 || x2 < x1 {
        return Ok(None);
    }

    let player = &rc.viewplayer;

    // store information in a vissprite
    let mut vis = VisSprite {
        mobjflags: MobjFlags::empty(),
        playerclass: 0,
        psprite: true,
        texturemid: ((BASEYCENTER << FRACBITS) + FRACUNIT / 2)
            .wrapping_sub(psp.sy.wrapping_sub(spritelump.topoffset)),
        x1: x1.max(0),
        x2: x2.min(rc.viewwidth - 1),
        scale: rc.tc.pspritescale << rc.detailshift,
        patch: lump,
        ..VisSprite::default()
    };

    if rc.viewheight == SCREENHEIGHT as i32 {
        let sy = PSPRITE_SY
            .get(player.class.index())
            .and_then(|weapons| weapons.get(player.readyweapon))
            .copied()
            .unwrap_or(0);
        vis.texturemid = vis.texturemid.wrapping_sub(sy);
    }

    if flip {
        vis.xiscale = -rc.tc.pspriteiscale;
        vis.startfrac = spritelump.width - 1;
    } else {
        vis.xiscale = rc.tc.pspriteiscale;
        vis.startfrac = 0;
    }

    if vis.x1 > x1 {
        vis.startfrac = vis.startfrac.wrapping_add(vis.xiscale.wrapping_mul(vis.x1 - x1));
    }

    let locallight = rc.scalelight[rc.tc.spritelights][MAXLIGHTSCALE - 1];

    if player.invulnerability != 0 && player.class == PlayerClass::Cleric {
        vis.colormap = locallight;
        if player.invulnerability > 4 * 32 {
            if player.mo.flags2.contains(MobjFlags2::DONTDRAW) {
                // don't draw the psprite
                vis.mobjflags |= MobjFlags::SHADOW;
            } else if player.mo.flags.contains(MobjFlags::SHADOW) {
                vis.mobjflags |= MobjFlags::ALTSHADOW;
            }
        } else if player.invulnerability & 8 != 0 {
            vis.mobjflags |= MobjFlags::SHADOW;
        }
    } else if let Some(fixed) = rc.fixedcolormap {
        // fixed color
        vis.colormap = fixed;
    } else if state.frame & FF_FULLBRIGHT != 0 {
        // full bright
        vis.colormap = 0;
    } else {
        // local light
        vis.colormap = locallight;
    }

    Ok(Some(vis))
}

//
// draw_psprite
//
// e.g. current weapon
fn draw_psprite(rc: &mut RenderContext, psp: &PspDef, state: PspState) -> Result<(), RenderError> {
    let Some(vis) = project_psprite(rc, psp, state)? else {
        return Ok(());
    };

    // clip to screen bounds
    draw_vis_sprite(&mut rc.vc, &rc.rd, &vis, &rc.tc.screenheightarray, &rc.tc.negonearray)
}

//
// draw_player_sprites
//
pub fn draw_player_sprites(rc: &mut RenderContext) -> Result<(), RenderError> {
    // get light level
    let lightnum = ((rc.viewlightlevel as i32) >> LIGHTSEGSHIFT) + rc.extralight;
    rc.tc.spritelights = lightnum.clamp(0, LIGHTLEVELS as i32 - 1) as usize;

    // add all active psprites
    let psprites = rc.viewplayer.psprites;
    for psp in psprites.iter() {
        if let Some(state) = psp.state {
            draw_psprite(rc, psp, state)?;
        }
    }
    Ok(())
}

//
// resolve_clip
// Builds the clip envelope of a vissprite in
//  clipbot/cliptop over its column range, drawing
//  the masked mid textures found to be behind it.
//
pub fn resolve_clip(rc: &mut RenderContext, spr: &VisSprite) -> Result<(), RenderError> {
    let (sx1, sx2) = (spr.x1 as usize, spr.x2 as usize);
    rc.tc.clipbot[sx1..=sx2].fill(-2);
    rc.tc.cliptop[sx1..=sx2].fill(-2);

    // Scan drawsegs from end to start for obscuring segs.
    // The first drawseg that has a greater scale
    //  is the clip seg.
    for index in (0..rc.bc.drawsegs.len()).rev() {
        let ds = rc.bc.drawsegs[index];

        // determine if the drawseg obscures the sprite
        if ds.x1 > spr.x2
            || ds.x2 < spr.x1
            || (ds.silhouette.is_empty() && ds.masked.is_none())
        {
            // does not cover sprite
            continue;
        }

        let r1 = ds.x1.max(spr.x1);
        let r2 = ds.x2.min(spr.x2);

        let (lowscale, scale) = if ds.scale1 > ds.scale2 {
            (ds.scale2, ds.scale1)
        } else {
            (ds.scale1, ds.scale2)
        };

        if scale < spr.scale
            || (lowscale < spr.scale && point_on_seg_side(spr.gx, spr.gy, &ds.curline) == 0)
        {
            // masked mid texture?
            if ds.masked.is_some() {
                render_masked_seg_range(rc, index, r1, r2)?;
            }
            // seg is behind sprite
            continue;
        }

        // clip this piece of the sprite
        let mut silhouette = ds.silhouette;

        if spr.gz >= ds.bsilheight {
            silhouette.remove(Silhouette::BOTTOM);
        }

        if spr.gzt <= ds.tsilheight {
            silhouette.remove(Silhouette::TOP);
        }

        let bottom = ds.sprbottomclip.filter(|_| silhouette.contains(Silhouette::BOTTOM));
        let top = ds.sprtopclip.filter(|_| silhouette.contains(Silhouette::TOP));

        for x in r1..=r2 {
            let xi = x as usize;
            if let Some(clip) = bottom {
                if rc.tc.clipbot[xi] == -2 {
                    rc.tc.clipbot[xi] = rc.bc.clip_value(clip, &ds, x, rc.viewheight);
                }
            }
            if let Some(clip) = top {
                if rc.tc.cliptop[xi] == -2 {
                    rc.tc.cliptop[xi] = rc.bc.clip_value(clip, &ds, x, rc.viewheight);
                }
            }
        }
    }

    // check for unclipped columns
    for x in sx1..=sx2 {
        if rc.tc.clipbot[x] == -2 {
            rc.tc.clipbot[x] = rc.viewheight as i16;
        }

        if rc.tc.cliptop[x] == -2 {
            rc.tc.cliptop[x] = -1;
        }
    }
    Ok(())
}

//
// draw_sprite
//
pub fn draw_sprite(rc: &mut RenderContext, spr: &VisSprite) -> Result<(), RenderError> {
    resolve_clip(rc, spr)?;

    // all clipping has been performed, so draw the sprite
    draw_vis_sprite(&mut rc.vc, &rc.rd, spr, &rc.tc.clipbot, &rc.tc.cliptop)
}

//
// draw_masked
//
pub fn draw_masked(rc: &mut RenderContext) -> Result<(), RenderError> {
    // Sort sprites according to scale
    rc.tc.vissprites.sort_vis_sprites();

    if rc.tc.badclasses > 1 {
        debug!(
            "R_DrawMasked: {} things with a bad translation class",
            rc.tc.badclasses
        );
    }

    if rc.tc.vissprites.dropped() > 0 {
        debug!(
            "R_DrawMasked: {} vissprites over the limit of {}",
            rc.tc.vissprites.dropped(),
            rc.tc.vissprites.capacity()
        );
    }

    // draw all vissprites back to front
    for n in 0..rc.tc.vissprites.sorted().len() {
        let index = rc.tc.vissprites.sorted()[n];
        let Some(spr) = rc.tc.vissprites.get(index).copied() else {
            continue;
        };
        draw_sprite(rc, &spr)?;
    }

    // render any remaining masked mid textures
    for index in (0..rc.bc.drawsegs.len()).rev() {
        let ds = rc.bc.drawsegs[index];
        if ds.masked.is_some() {
            render_masked_seg_range(rc, index, ds.x1, ds.x2)?;
        }
    }

    // draw the psprites on top of everything
    //  but does not draw on side views
    if rc.view.viewangleoffset.unsigned_abs() <= PSPRITE_SIDEVIEW_LIMIT {
        draw_player_sprites(rc)?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::r_bsp::{DrawSeg, SegLine, SpriteClip};
    use crate::test_support::{face_east, render_context, render_context_with, solid_patch, sprite_wad};

    fn patch() -> Vec<u8> {
        solid_patch(16, 16, 8, 16, 7)
    }

    fn catalog(lumps: &[&str], names: &[&str], shareware: bool) -> Result<SpriteCatalog, SpriteError> {
        let lumps: Vec<(&str, Vec<u8>)> = lumps.iter().map(|&name| (name, patch())).collect();
        let wad = sprite_wad(&lumps);
        let rd = RenderData::init(std::sync::Arc::new(wad)).unwrap();
        SpriteCatalog::init_sprite_defs(&rd, names, shareware)
    }

    // eight rotations, the right hand side mirrored from the left
    const IMP_LUMPS: [&str; 5] = ["IMP0A1", "IMP0A2A8", "IMP0A3A7", "IMP0A4A6", "IMP0A5"];

    fn imp_context() -> RenderContext {
        let lumps: Vec<(&str, Vec<u8>)> = IMP_LUMPS.iter().map(|&name| (name, patch())).collect();
        let mut rc = render_context(sprite_wad(&lumps), &["IMP0"]);
        face_east(&mut rc);
        rc
    }

    fn thing_at(x: Fixed, angle: Angle) -> Mobj {
        Mobj {
            x,
            angle,
            ..Mobj::default()
        }
    }

    #[test]
    fn rotations_and_flips_are_installed() {
        let sprites = catalog(&IMP_LUMPS, &["IMP0"], false).unwrap();
        let frame = sprites.frame(0, 0).unwrap();
        assert!(frame.rotate);
        assert_eq!(frame.lump, [0, 1, 2, 3, 4, 3, 2, 1]);
        assert_eq!(frame.flip, [false, false, false, false, false, true, true, true]);
    }

    #[test]
    fn single_rotation_frames() {
        let sprites = catalog(&["BALLA0", "BALLB0C0"], &["BALL"], false).unwrap();
        let def = sprites.sprite(0).unwrap();
        assert_eq!(def.numframes(), 3);
        for frame in &def.frames {
            assert!(!frame.rotate);
        }
        assert_eq!(def.frames[2].lump, [1; 8]);
        assert_eq!(def.frames[2].flip, [true; 8]);
        assert_eq!(def.frames[1].flip, [false; 8]);
    }

    #[test]
    fn catalog_errors() {
        assert!(matches!(
            catalog(&["BALLA0", "BALLA0"], &["BALL"], false),
            Err(SpriteError::MultipleRot0 { frame: 'A', .. })
        ));
        assert!(matches!(
            catalog(&["BALLA0", "BALLA3"], &["BALL"], false),
            Err(SpriteError::MixedRotations { frame: 'A', .. })
        ));
        assert!(matches!(
            catalog(&["BALLA3", "BALLA0"], &["BALL"], false),
            Err(SpriteError::MixedRotations { frame: 'A', .. })
        ));
        assert!(matches!(
            catalog(&["BALLA3", "BALLA1A3"], &["BALL"], false),
            Err(SpriteError::DuplicateLump { frame: 'A', rotation: '3', .. })
        ));
        assert!(matches!(
            catalog(&["BALLA0", "BALLC0"], &["BALL"], false),
            Err(SpriteError::MissingFrame { frame: 'B', .. })
        ));
        assert!(matches!(
            catalog(&["BALLA9"], &["BALL"], false),
            Err(SpriteError::BadFrameCharacters(_))
        ));
        assert!(matches!(
            catalog(&["BALL_0"], &["BALL"], false),
            Err(SpriteError::BadFrameCharacters(_))
        ));
    }

    #[test]
    fn missing_sprites_allowed_in_shareware() {
        assert_eq!(
            catalog(&["BALLA0"], &["BALL", "CYBR"], false).unwrap_err(),
            SpriteError::NoLumps("CYBR".into())
        );
        let sprites = catalog(&["BALLA0"], &["BALL", "CYBR"], true).unwrap();
        assert_eq!(sprites.num_sprites(), 2);
        assert_eq!(sprites.sprite(1).unwrap().numframes(), 0);
        assert_eq!(sprites.frame(1, 0), Err(SpriteError::InvalidFrame { sprite: 1, frame: 0 }));
        assert_eq!(sprites.frame(2, 0), Err(SpriteError::InvalidSprite(2)));
    }

    #[test]
    fn frame_lookup_ignores_full_bright() {
        let sprites = catalog(&["BALLA0"], &["BALL"], false).unwrap();
        assert!(sprites.frame(0, FF_FULLBRIGHT).is_ok());
    }

    #[test]
    fn pool_overflow_goes_to_one_slot() {
        let mut pool = VisSpritePool::new(2);
        for scale in 1..=3 {
            pool.new_vissprite().scale = scale;
        }
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.dropped(), 1);
        assert_eq!(pool.overflow().scale, 3);
        assert!(pool.iter().all(|vis| vis.scale != 3));

        pool.clear_sprites();
        assert!(pool.is_empty());
        assert_eq!(pool.dropped(), 0);
    }

    #[test]
    fn sort_is_back_to_front_and_stable() {
        let mut pool = VisSpritePool::new(8);
        for scale in [3, 1, 2, 1] {
            pool.new_vissprite().scale = scale;
        }
        assert_eq!(pool.sort_vis_sprites(), &[1, 3, 2, 0]);
    }

    #[test]
    fn projection_in_front() {
        let mut rc = imp_context();
        project_sprite(&mut rc, &thing_at(128 * FRACUNIT, 0)).unwrap();

        assert_eq!(rc.tc.vissprites.len(), 1);
        let vis = rc.tc.vissprites.get(0).unwrap();
        // projection 160, depth 128
        assert_eq!(vis.scale, 81920);
        assert_eq!((vis.x1, vis.x2), (150, 169));
        assert_eq!(vis.xiscale, 52428);
        assert_eq!(vis.startfrac, 0);
        assert_eq!(vis.gzt, 16 * FRACUNIT);
        assert_eq!(vis.texturemid, 16 * FRACUNIT);
        // facing away from the viewer shows rotation 5
        assert_eq!(vis.patch, 4);
    }

    #[test]
    fn things_behind_or_at_the_viewer_are_rejected() {
        let mut rc = imp_context();
        project_sprite(&mut rc, &thing_at(-64 * FRACUNIT, 0)).unwrap();
        project_sprite(&mut rc, &thing_at(0, 0)).unwrap();
        project_sprite(&mut rc, &thing_at(3 * FRACUNIT, 0)).unwrap();
        assert!(rc.tc.vissprites.is_empty());

        // too far off the side
        let mut side = thing_at(16 * FRACUNIT, 0);
        side.y = 100 * FRACUNIT;
        project_sprite(&mut rc, &side).unwrap();
        assert!(rc.tc.vissprites.is_empty());
    }

    #[test]
    fn never_drawn_things_are_skipped() {
        let mut rc = imp_context();
        let mut thing = thing_at(128 * FRACUNIT, 0);
        thing.flags2 = MobjFlags2::DONTDRAW;
        project_sprite(&mut rc, &thing).unwrap();
        assert!(rc.tc.vissprites.is_empty());
    }

    #[test]
    fn rotation_follows_facing_and_mirrors() {
        let mut rc = imp_context();
        // facing the viewer, then turned 45 degrees either way
        project_sprite(&mut rc, &thing_at(128 * FRACUNIT, ANG180)).unwrap();
        project_sprite(&mut rc, &thing_at(128 * FRACUNIT, ANG180 - ANG45)).unwrap();
        project_sprite(&mut rc, &thing_at(128 * FRACUNIT, ANG180 + ANG45)).unwrap();

        let front = *rc.tc.vissprites.get(0).unwrap();
        let left = *rc.tc.vissprites.get(1).unwrap();
        let right = *rc.tc.vissprites.get(2).unwrap();
        assert_eq!(front.patch, 0);
        assert_eq!(left.patch, 1);
        assert_eq!(right.patch, 1);

        assert_eq!(left.xiscale, -right.xiscale);
        assert_eq!(left.startfrac, 0);
        assert_eq!(right.startfrac, 16 * FRACUNIT - 1 - left.startfrac);
        assert_eq!((left.x1, left.x2), (right.x1, right.x2));
    }

    #[test]
    fn lighting_selection() {
        let mut rc = imp_context();
        rc.tc.spritelights = 8;
        let mut thing = thing_at(128 * FRACUNIT, 0);
        project_sprite(&mut rc, &thing).unwrap();
        assert_eq!(rc.tc.vissprites.get(0).unwrap().colormap, rc.scalelight[8][20]);
        assert_eq!(rc.scalelight[8][20], 18 * COLORMAP_SIZE);

        thing.frame = FF_FULLBRIGHT;
        project_sprite(&mut rc, &thing).unwrap();
        assert_eq!(rc.tc.vissprites.get(1).unwrap().colormap, 0);

        rc.tc.level_use_full_bright = false;
        project_sprite(&mut rc, &thing).unwrap();
        assert_eq!(rc.tc.vissprites.get(2).unwrap().colormap, rc.scalelight[8][20]);

        rc.fixedcolormap = Some(5 * COLORMAP_SIZE);
        rc.tc.level_use_full_bright = true;
        project_sprite(&mut rc, &thing).unwrap();
        assert_eq!(rc.tc.vissprites.get(3).unwrap().colormap, 5 * COLORMAP_SIZE);
    }

    #[test]
    fn translation_class_is_clamped() {
        let mut rc = imp_context();
        let mut thing = thing_at(128 * FRACUNIT, 0);
        thing.flags = MobjFlags::from_bits_retain(2 << MF_TRANSSHIFT);
        thing.player_class = Some(PlayerClass::Mage);
        project_sprite(&mut rc, &thing).unwrap();

        thing.player_class = Some(PlayerClass::Pig);
        project_sprite(&mut rc, &thing).unwrap();

        thing.player_class = None;
        thing.special1 = 1;
        project_sprite(&mut rc, &thing).unwrap();

        let classes: Vec<usize> = rc.tc.vissprites.iter().map(|v| v.playerclass).collect();
        assert_eq!(classes, vec![2, 0, 1]);

        let mage = rc.tc.vissprites.get(0).unwrap();
        assert_eq!(translation_offset(mage), 2 * 7 * 256 + 256);
    }

    #[test]
    fn bad_classes_are_counted_per_frame() {
        let mut rc = imp_context();
        let mut pig = thing_at(128 * FRACUNIT, 0);
        pig.flags = MobjFlags::from_bits_retain(1 << MF_TRANSSHIFT);
        pig.player_class = Some(PlayerClass::Pig);

        for _ in 0..3 {
            project_sprite(&mut rc, &pig).unwrap();
        }
        assert_eq!(rc.tc.badclasses, 3);
        assert!(rc.tc.vissprites.iter().all(|v| v.playerclass == 0));

        rc.tc.clear_sprites();
        assert_eq!(rc.tc.badclasses, 0);
        project_sprite(&mut rc, &pig).unwrap();
        assert_eq!(rc.tc.badclasses, 1);
    }

    #[test]
    fn invalid_sprite_numbers() {
        let mut rc = imp_context();
        let mut thing = thing_at(128 * FRACUNIT, 0);
        thing.sprite = 5;
        let result = project_sprite(&mut rc, &thing);
        if cfg!(feature = "rangecheck") {
            assert!(matches!(
                result,
                Err(RenderError::Sprite(SpriteError::InvalidSprite(5)))
            ));
        } else {
            assert!(result.is_ok());
        }
        assert!(rc.tc.vissprites.is_empty());
    }

    #[test]
    fn add_sprites_once_per_frame() {
        let mut rc = imp_context();
        let things = vec![thing_at(128 * FRACUNIT, 0), thing_at(256 * FRACUNIT, 0)];
        let mut sector = Sector {
            lightlevel: 255,
            validcount: 0,
            thinglist: vec![0, 1, 7],
        };

        add_sprites(&mut rc, &mut sector, &things).unwrap();
        add_sprites(&mut rc, &mut sector, &things).unwrap();
        assert_eq!(rc.tc.vissprites.len(), 2);
        assert_eq!(rc.tc.spritelights, LIGHTLEVELS - 1);
        assert_eq!(sector.validcount, rc.validcount);
    }

    #[test]
    fn empty_occlusion_list_leaves_sprite_visible() {
        let mut rc = imp_context();
        project_sprite(&mut rc, &thing_at(128 * FRACUNIT, 0)).unwrap();
        let spr = *rc.tc.vissprites.get(0).unwrap();

        resolve_clip(&mut rc, &spr).unwrap();
        for x in spr.x1 as usize..=spr.x2 as usize {
            assert_eq!(rc.tc.clipbot[x], rc.viewheight as i16);
            assert_eq!(rc.tc.cliptop[x], -1);
        }
    }

    #[test]
    fn nearer_segs_clip_and_farther_segs_do_not() {
        let mut rc = imp_context();
        project_sprite(&mut rc, &thing_at(128 * FRACUNIT, 0)).unwrap();
        let spr = *rc.tc.vissprites.get(0).unwrap();

        let bottom = rc.bc.alloc_openings(&[100; 16]);
        let wall = SegLine {
            x1: 64 * FRACUNIT,
            y1: 64 * FRACUNIT,
            x2: 64 * FRACUNIT,
            y2: -64 * FRACUNIT,
        };
        // nearer than the sprite
        rc.bc.store_drawseg(DrawSeg {
            curline: wall,
            x1: 140,
            x2: 155,
            scale1: 2 * FRACUNIT,
            scale2: 2 * FRACUNIT,
            silhouette: Silhouette::BOTH,
            sprbottomclip: Some(SpriteClip::Opening(bottom)),
            sprtopclip: Some(SpriteClip::NegOne),
            ..DrawSeg::default()
        });
        // farther away, would hide everything
        rc.bc.store_drawseg(DrawSeg {
            curline: wall,
            x1: 0,
            x2: 319,
            scale1: FRACUNIT / 2,
            scale2: FRACUNIT / 2,
            silhouette: Silhouette::BOTH,
            sprbottomclip: Some(SpriteClip::NegOne),
            sprtopclip: Some(SpriteClip::ScreenHeight),
            ..DrawSeg::default()
        });

        resolve_clip(&mut rc, &spr).unwrap();
        assert_eq!(rc.tc.clipbot[150], 100);
        assert_eq!(rc.tc.clipbot[155], 100);
        assert_eq!(rc.tc.cliptop[155], -1);
        assert_eq!(rc.tc.clipbot[156], rc.viewheight as i16);
    }

    #[test]
    fn silhouette_heights_limit_clipping() {
        let mut rc = imp_context();
        project_sprite(&mut rc, &thing_at(128 * FRACUNIT, 0)).unwrap();
        let spr = *rc.tc.vissprites.get(0).unwrap();

        // the sprite stands on top of this lower wall
        rc.bc.store_drawseg(DrawSeg {
            x1: 0,
            x2: 319,
            scale1: 2 * FRACUNIT,
            scale2: 2 * FRACUNIT,
            silhouette: Silhouette::BOTTOM,
            bsilheight: 0,
            sprbottomclip: Some(SpriteClip::NegOne),
            ..DrawSeg::default()
        });

        resolve_clip(&mut rc, &spr).unwrap();
        assert_eq!(rc.tc.clipbot[160], rc.viewheight as i16);
    }

    #[test]
    fn sprite_paints_its_box() {
        let mut rc = imp_context();
        project_sprite(&mut rc, &thing_at(128 * FRACUNIT, 0)).unwrap();
        draw_masked(&mut rc).unwrap();

        // centery 80, top at 80 - 16 * 1.25
        assert_eq!(rc.vc.pixel(150, 59), 0);
        assert_eq!(rc.vc.pixel(150, 60), 7);
        assert_eq!(rc.vc.pixel(169, 79), 7);
        assert_eq!(rc.vc.pixel(160, 80), 0);
        assert_eq!(rc.vc.pixel(149, 70), 0);
        assert_eq!(rc.vc.pixel(170, 70), 0);
    }

    #[test]
    fn floorclip_sinks_sprites() {
        let mut rc = imp_context();
        let mut thing = thing_at(128 * FRACUNIT, 0);
        thing.floorclip = 4 * FRACUNIT;
        project_sprite(&mut rc, &thing).unwrap();
        draw_masked(&mut rc).unwrap();

        assert_eq!(rc.vc.pixel(150, 64), 0);
        assert_eq!(rc.vc.pixel(150, 65), 7);
        assert_eq!(rc.vc.pixel(150, 80), 7);
        assert_eq!(rc.vc.pixel(150, 81), 0);
    }

    #[test]
    fn nearer_sprites_are_painted_last() {
        let lumps = vec![
            ("FARTA0", solid_patch(16, 16, 8, 16, 7)),
            ("NEARA0", solid_patch(16, 16, 8, 16, 9)),
        ];
        let mut rc = render_context(sprite_wad(&lumps), &["FART", "NEAR"]);
        face_east(&mut rc);

        let mut near = thing_at(64 * FRACUNIT, 0);
        near.sprite = 1;
        project_sprite(&mut rc, &near).unwrap();
        project_sprite(&mut rc, &thing_at(128 * FRACUNIT, 0)).unwrap();

        draw_masked(&mut rc).unwrap();
        assert_eq!(rc.vc.pixel(160, 70), 9);
    }

    #[test]
    fn overflow_sprites_are_never_painted() {
        let config = RenderConfig {
            max_vissprites: 1,
            ..RenderConfig::default()
        };
        let lumps = vec![
            ("FARTA0", solid_patch(16, 16, 8, 16, 7)),
            ("NEARA0", solid_patch(16, 16, 8, 16, 9)),
        ];
        let mut rc = render_context_with(sprite_wad(&lumps), &["FART", "NEAR"], &config);
        face_east(&mut rc);

        let mut near = thing_at(64 * FRACUNIT, 0);
        near.sprite = 1;
        project_sprite(&mut rc, &thing_at(128 * FRACUNIT, 0)).unwrap();
        project_sprite(&mut rc, &near).unwrap();
        assert_eq!(rc.tc.vissprites.len(), 1);
        assert_eq!(rc.tc.vissprites.dropped(), 1);
        assert_eq!(rc.tc.vissprites.overflow().patch, 1);

        draw_masked(&mut rc).unwrap();
        assert_eq!(rc.vc.pixel(160, 70), 7);
        assert_eq!(rc.vc.pixel(160, 45), 0);
    }

    fn weapon_context() -> RenderContext {
        let lumps = vec![("WEAPA0", solid_patch(16, 16, 8, 0, 5))];
        let mut rc = render_context(sprite_wad(&lumps), &["WEAP"]);
        face_east(&mut rc);
        rc.viewplayer.psprites[0] = PspDef {
            state: Some(PspState { sprite: 0, frame: 0 }),
            sx: 160 * FRACUNIT,
            sy: 32 * FRACUNIT,
        };
        rc
    }

    #[test]
    fn weapon_overlay_is_drawn_in_screen_space() {
        let mut rc = weapon_context();
        draw_masked(&mut rc).unwrap();

        assert_eq!(rc.vc.pixel(152, 11), 0);
        assert_eq!(rc.vc.pixel(152, 12), 5);
        assert_eq!(rc.vc.pixel(167, 27), 5);
        assert_eq!(rc.vc.pixel(168, 20), 0);
        assert_eq!(rc.vc.pixel(152, 28), 0);
    }

    #[test]
    fn weapon_overlay_full_screen_adjustment() {
        let mut rc = weapon_context();
        rc.set_view_size(11, 0);
        rc.execute_set_view_size();
        rc.viewplayer.class = PlayerClass::Mage;
        rc.viewplayer.readyweapon = 1;

        let psp = rc.viewplayer.psprites[0];
        let vis = project_psprite(&rc, &psp, psp.state.unwrap()).unwrap().unwrap();
        assert!(vis.psprite);
        assert_eq!(vis.texturemid, (100 * FRACUNIT + FRACUNIT / 2) - 32 * FRACUNIT - 20 * FRACUNIT);
    }

    #[test]
    fn cleric_invulnerability_tiers() {
        let mut rc = weapon_context();
        rc.viewplayer.class = PlayerClass::Cleric;
        let psp = rc.viewplayer.psprites[0];
        let state = psp.state.unwrap();

        rc.viewplayer.invulnerability = 200;
        rc.viewplayer.mo.flags2 = MobjFlags2::DONTDRAW;
        let vis = project_psprite(&rc, &psp, state).unwrap().unwrap();
        assert_eq!(vis.mobjflags, MobjFlags::SHADOW);

        rc.viewplayer.mo.flags2 = MobjFlags2::empty();
        rc.viewplayer.mo.flags = MobjFlags::SHADOW;
        let vis = project_psprite(&rc, &psp, state).unwrap().unwrap();
        assert_eq!(vis.mobjflags, MobjFlags::ALTSHADOW);

        rc.viewplayer.invulnerability = 8;
        let vis = project_psprite(&rc, &psp, state).unwrap().unwrap();
        assert_eq!(vis.mobjflags, MobjFlags::SHADOW);

        rc.viewplayer.invulnerability = 7;
        let vis = project_psprite(&rc, &psp, state).unwrap().unwrap();
        assert_eq!(vis.mobjflags, MobjFlags::empty());
        assert_eq!(vis.colormap, rc.scalelight[rc.tc.spritelights][MAXLIGHTSCALE - 1]);

        // other classes just see the fixed colormap
        rc.viewplayer.class = PlayerClass::Fighter;
        rc.fixedcolormap = Some(2 * COLORMAP_SIZE);
        let vis = project_psprite(&rc, &psp, state).unwrap().unwrap();
        assert_eq!(vis.colormap, 2 * COLORMAP_SIZE);
    }

    #[test]
    fn side_views_shift_or_hide_the_weapon() {
        let mut rc = weapon_context();
        rc.view.viewangleoffset = 64 << ANGLETOFINESHIFT;
        let psp = rc.viewplayer.psprites[0];
        let vis = project_psprite(&rc, &psp, psp.state.unwrap()).unwrap().unwrap();
        // (160 / 1024) * 64 pixels to the right
        assert_eq!(vis.x1, 152 + 10);

        rc.view.viewangleoffset = 2048 << ANGLETOFINESHIFT;
        draw_masked(&mut rc).unwrap();
        assert!(rc.vc.screen.iter().all(|&p| p == 0));
    }
}
