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
//	Software refresh of things: sprite catalog, projection,
//	clipping against wall silhouettes, masked column drawing,
//	depth sorting and the player weapon overlays.
//
//-----------------------------------------------------------------------------

pub mod config;
pub mod defs;
pub mod m_fixed;
pub mod r_bsp;
pub mod r_data;
pub mod r_draw;
pub mod r_main;
pub mod r_segs;
pub mod r_things;
pub mod tables;
pub mod w_wad;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, RenderConfig};
pub use r_main::{RenderContext, RenderError};
pub use r_things::{SpriteCatalog, SpriteError, VisSprite, VisSpritePool};
pub use w_wad::{Wad, WadError};
