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
//	Shared constants, flags and the game object structures
//	 consumed by the refresh.
//
//-----------------------------------------------------------------------------

use bitflags::bitflags;

pub type Fixed = i32;
pub type Angle = u32;

pub const FRACBITS: i32 = 16;
pub const FRACUNIT: Fixed = 1 << FRACBITS;
pub const MAXINT: i32 = i32::MAX;
pub const MININT: i32 = i32::MIN;
pub const MAXSHORT: i16 = i16::MAX;

pub const SCREENWIDTH: usize = 320;
pub const SCREENHEIGHT: usize = 200;

// status bar height at bottom of screen
pub const SBARHEIGHT: i32 = 39;
pub const BASEYCENTER: i32 = 100;

//
// Binary angles.
//
pub const ANG45: Angle = 0x2000_0000;
pub const ANG90: Angle = 0x4000_0000;
pub const ANG180: Angle = 0x8000_0000;
pub const ANG270: Angle = 0xc000_0000;

pub const FINEANGLES: usize = 8192;
pub const FINEMASK: usize = FINEANGLES - 1;
// 0x100000000 to 0x2000
pub const ANGLETOFINESHIFT: u32 = 19;

pub const SLOPERANGE: usize = 2048;
pub const SLOPEBITS: u32 = 11;
pub const DBITS: u32 = (FRACBITS as u32) - SLOPEBITS;

//
// Lighting constants.
// Now why not 32 levels here?
//
pub const LIGHTLEVELS: usize = 16;
pub const LIGHTSEGSHIFT: i32 = 4;
pub const MAXLIGHTSCALE: usize = 48;
pub const LIGHTSCALESHIFT: i32 = 12;
pub const NUMCOLORMAPS: usize = 32;

// Frame flags: the frame number of a state or thing
//  carries the full bright bit in its high half.
pub const FF_FULLBRIGHT: u32 = 0x8000;
pub const FF_FRAMEMASK: u32 = 0x7fff;

pub const MAXPLAYERS: usize = 8;
pub const NUMCLASSES: usize = 4;
pub const NUMWEAPONS: usize = 4;
pub const NUMPSPRITES: usize = 2;

// Color translation bits, one of seven remaps per class.
pub const MF_TRANSSHIFT: u32 = 26;

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct MobjFlags: u32 {
        // use fuzzy draw (shadow demons / invisible players)
        const SHADOW = 0x0004_0000;
        const TRANSLATION = 0x1c00_0000;
        // alternate fuzzy draw
        const ALTSHADOW = 0x4000_0000;
    }
}

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct MobjFlags2: u32 {
        // never make a vissprite for this thing
        const DONTDRAW = 0x0010_0000;
    }
}

bitflags! {
    // vertical clipping contributed by a wall segment
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Silhouette: u8 {
        const BOTTOM = 0x01;
        const TOP = 0x02;
        const BOTH = 0x03;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PlayerClass {
    #[default]
    Fighter,
    Cleric,
    Mage,
    Pig,
}

impl PlayerClass {
    pub fn index(self) -> usize {
        match self {
            PlayerClass::Fighter => 0,
            PlayerClass::Cleric => 1,
            PlayerClass::Mage => 2,
            PlayerClass::Pig => 3,
        }
    }
}

//
// A thing in the world, as far as the refresh cares.
// Position and angle are in map space, sprite and frame
//  select the picture from the sprite catalog.
//
#[derive(Debug, Default, Clone)]
pub struct Mobj {
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
    pub angle: Angle,

    pub sprite: usize,
    // may carry FF_FULLBRIGHT
    pub frame: u32,

    pub flags: MobjFlags,
    pub flags2: MobjFlags2,

    // sinking into liquid floors
    pub floorclip: Fixed,

    // owning sector, index into the level sector list
    pub sector: usize,

    // set when the thing is a player body
    pub player_class: Option<PlayerClass>,
    // color class of corpses and other translated non-players
    pub special1: i32,
}

#[derive(Debug, Default, Clone)]
pub struct Sector {
    pub lightlevel: i16,
    // if == validcount, already checked
    pub validcount: i32,
    // things in the sector, indices into the level thing list
    pub thinglist: Vec<usize>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PspState {
    pub sprite: usize,
    pub frame: u32,
}

//
// Overlay psprites are scaled shapes
//  drawn directly on the view screen,
//  coordinates are given for a 320*200 view screen.
//
#[derive(Debug, Default, Clone, Copy)]
pub struct PspDef {
    // None means not active
    pub state: Option<PspState>,
    pub sx: Fixed,
    pub sy: Fixed,
}

#[derive(Debug, Default, Clone)]
pub struct Player {
    pub mo: Mobj,
    pub class: PlayerClass,
    pub readyweapon: usize,

    // focal origin above the floor
    pub viewz: Fixed,
    // look up/down
    pub lookdir: i32,
    // so gun flashes light up areas
    pub extralight: i32,
    // current palette effect, 0 for none
    pub fixedcolormap: i32,
    // remaining invulnerability tics
    pub invulnerability: i32,

    pub psprites: [PspDef; NUMPSPRITES],
}
