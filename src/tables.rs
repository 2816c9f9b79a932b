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
//	Lookup tables.
//	Do not try to look them up :-).
//	In the order of appearance:
//
//	finesine - Sine lookup, which doubles as cosine
//	 with a quarter turn offset.
//
//	tantoangle - ArcTan LUT,
//	  maps tan(angle) to angle fast. Gotta search.
//
//-----------------------------------------------------------------------------

use std::f64::consts::PI;
use std::sync::OnceLock;

use crate::defs::*;

struct Tables {
    finesine: Vec<Fixed>,
    tantoangle: Vec<Angle>,
}

static TABLES: OnceLock<Tables> = OnceLock::new();

//
// init_tables
// Generated once, the first time any table is touched.
//
fn init_tables() -> Tables {
    // finesine table, with the extra quarter turn
    //  so finecosine can share it
    let finesine = (0..5 * FINEANGLES / 4)
        .map(|i| {
            let a = ((i as f64) + 0.5) * PI * 2.0 / (FINEANGLES as f64);
            ((FRACUNIT as f64) * a.sin()) as Fixed
        })
        .collect();

    // slope (tangent) to angle lookup
    let tantoangle = (0..=SLOPERANGE)
        .map(|i| {
            let f = ((i as f64) / (SLOPERANGE as f64)).atan() / (PI * 2.0);
            ((u32::MAX as f64) * f) as Angle
        })
        .collect();

    Tables {
        finesine,
        tantoangle,
    }
}

fn tables() -> &'static Tables {
    TABLES.get_or_init(init_tables)
}

pub fn finesine(index: usize) -> Fixed {
    tables().finesine[index & FINEMASK]
}

pub fn finecosine(index: usize) -> Fixed {
    tables().finesine[(index & FINEMASK) + FINEANGLES / 4]
}

pub fn tantoangle(index: usize) -> Angle {
    tables().tantoangle[index.min(SLOPERANGE)]
}

//
// slope_div
// Tangent of num/den scaled to an index into tantoangle.
//
pub fn slope_div(num: u32, den: u32) -> usize {
    if den < 512 {
        return SLOPERANGE;
    }

    let ans = (num << 3) / (den >> 8);
    (ans as usize).min(SLOPERANGE)
}
