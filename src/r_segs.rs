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
//	All the clipping: columns, horizontal spans, sky columns.
//	Here only the masked mid textures left behind by the wall pass.
//
//-----------------------------------------------------------------------------

use crate::defs::*;
use crate::m_fixed::fixed_mul;
use crate::r_bsp::DrawSegIndex;
use crate::r_draw::{ColumnFunc, DrawColumnParams};
use crate::r_main::{RenderContext, RenderError};
use crate::r_things::{draw_masked_column, MaskedColumn};

//
// render_masked_seg_range
//
pub fn render_masked_seg_range(rc: &mut RenderContext, ds: DrawSegIndex,
                               x1: i32, x2: i32) -> Result<(), RenderError> {
    let Some(ds) = rc.bc.drawsegs.get(ds).copied() else {
        return Ok(());
    };
    let Some(masked) = ds.masked else {
        return Ok(());
    };

    // Calculate light table.
    // Use different light tables
    //   for horizontal / vertical / diagonal. Diagonal?
    let mut lightnum = ((masked.lightlevel as i32) >> LIGHTSEGSHIFT) + rc.extralight;

    if ds.curline.y1 == ds.curline.y2 {
        lightnum -= 1;
    } else if ds.curline.x1 == ds.curline.x2 {
        lightnum += 1;
    }

    let walllights = rc.scalelight[lightnum.clamp(0, LIGHTLEVELS as i32 - 1) as usize];

    let patch = rc.rd.patch(masked.texture)?;
    let width = patch.width().max(1);

    let mut dmc = MaskedColumn {
        dc: DrawColumnParams {
            texturemid: masked.texturemid,
            ..DrawColumnParams::default()
        },
        spryscale: ds.scale1.wrapping_add((x1 - ds.x1).wrapping_mul(ds.scalestep)),
        ..MaskedColumn::default()
    };

    if let Some(fixed) = rc.fixedcolormap {
        dmc.dc.colormap = fixed;
    }

    // draw the columns
    for x in x1.max(ds.x1)..=x2.min(ds.x2) {
        let slot = masked.maskedtexturecol + (x - ds.x1) as usize;
        let colnum = rc.bc.openings.get(slot).copied().unwrap_or(MAXSHORT);

        if colnum != MAXSHORT {
            // calculate lighting
            if rc.fixedcolormap.is_none() {
                let index = (dmc.spryscale >> LIGHTSCALESHIFT).clamp(0, MAXLIGHTSCALE as i32 - 1);
                dmc.dc.colormap = walllights[index as usize];
            }

            dmc.dc.x = x;
            dmc.sprtopscreen = rc.centeryfrac.wrapping_sub(fixed_mul(dmc.dc.texturemid, dmc.spryscale));
            dmc.dc.iscale = (0xffff_ffffu32 / (dmc.spryscale as u32).max(1)) as i32;
            dmc.floorclip = match ds.sprbottomclip {
                Some(clip) => rc.bc.clip_value(clip, &ds, x, rc.viewheight),
                None => rc.viewheight as i16,
            };
            dmc.ceilingclip = match ds.sprtopclip {
                Some(clip) => rc.bc.clip_value(clip, &ds, x, rc.viewheight),
                None => -1,
            };

            // draw the texture
            let column = patch.column((colnum as i32).rem_euclid(width))?;
            draw_masked_column(&mut rc.vc, ColumnFunc::Plain, &dmc, column);
            rc.bc.openings[slot] = MAXSHORT;
        }
        dmc.spryscale = dmc.spryscale.wrapping_add(ds.scalestep);
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::r_bsp::{DrawSeg, MaskedMid, SegLine, SpriteClip};
    use crate::r_data::encode_patch;
    use crate::test_support::{render_context, sprite_wad};

    fn grate_context() -> RenderContext {
        let mut wad = sprite_wad(&[]);
        let grate = encode_patch(0, 0, 16, &[vec![(0, vec![42; 16])], vec![(0, vec![43; 16])]]);
        wad.push_lump("GRATE", grate);
        render_context(wad, &[])
    }

    fn masked_seg(rc: &mut RenderContext, x1: i32, x2: i32) -> usize {
        let columns: Vec<i16> = (x1..=x2).map(|x| (x & 1) as i16).collect();
        let maskedtexturecol = rc.bc.alloc_openings(&columns);
        let texture = rc.rd.wad().get_num_for_name("GRATE").unwrap();
        rc.bc
            .store_drawseg(DrawSeg {
                curline: SegLine {
                    x1: 0,
                    y1: 0,
                    x2: 64 * FRACUNIT,
                    y2: 32 * FRACUNIT,
                },
                x1,
                x2,
                scale1: FRACUNIT,
                scale2: FRACUNIT,
                masked: Some(MaskedMid {
                    texture,
                    texturemid: 8 * FRACUNIT,
                    lightlevel: 255,
                    maskedtexturecol,
                }),
                ..DrawSeg::default()
            })
            .unwrap()
    }

    #[test]
    fn masked_columns_draw_once() {
        let mut rc = grate_context();
        let ds = masked_seg(&mut rc, 10, 13);

        render_masked_seg_range(&mut rc, ds, 10, 11).unwrap();
        let mid = rc.centery as usize;
        assert_eq!(rc.vc.pixel(10, mid), 42);
        assert_eq!(rc.vc.pixel(11, mid), 43);
        assert_eq!(rc.vc.pixel(12, mid), 0);

        let start = rc.bc.drawsegs[ds].masked.unwrap().maskedtexturecol;
        assert_eq!(rc.bc.openings[start], MAXSHORT);
        assert_eq!(rc.bc.openings[start + 1], MAXSHORT);
        assert_eq!(rc.bc.openings[start + 2], 0);

        // a second pass leaves drawn columns alone
        rc.vc.screen.iter_mut().for_each(|p| *p = 0);
        render_masked_seg_range(&mut rc, ds, 10, 13).unwrap();
        assert_eq!(rc.vc.pixel(10, mid), 0);
        assert_eq!(rc.vc.pixel(12, mid), 42);
    }

    #[test]
    fn masked_columns_respect_sprite_clips() {
        let mut rc = grate_context();
        let ds = masked_seg(&mut rc, 0, 0);
        let bottom = rc.bc.alloc_openings(&[(rc.centery + 2) as i16]);
        rc.bc.drawsegs[ds].sprbottomclip = Some(SpriteClip::Opening(bottom));
        rc.bc.drawsegs[ds].sprtopclip = Some(SpriteClip::NegOne);

        render_masked_seg_range(&mut rc, ds, 0, 0).unwrap();
        let mid = rc.centery as usize;
        assert_eq!(rc.vc.pixel(0, mid + 1), 42);
        assert_eq!(rc.vc.pixel(0, mid + 2), 0);
    }
}
