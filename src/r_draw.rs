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
//	The actual span/column drawing functions.
//	Here find the main potential for optimization,
//	 e.g. inline assembly, different algorithms.
//
//-----------------------------------------------------------------------------


use crate::defs::*;
use crate::r_data::{ColorTables, ColormapIndex, COLORMAP_SIZE};

#[derive(Debug, Clone, Copy, Default)]
pub struct DrawColumnParams {
    pub texturemid: Fixed,
    pub yl: i32,
    pub yh: i32,
    pub x: i32,
    // offset of the light table in colormaps
    pub colormap: ColormapIndex,
    pub iscale: Fixed,
    // offset of the remap in translationtables
    pub translation: usize,
}

//
// The column routine used for one sprite.
// Chosen per sprite from its flags and handed to the
//  masked column drawer, never kept as shared state.
//
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnFunc {
    #[default]
    Plain,
    Fuzz,
    AltFuzz,
    Translated,
    TranslatedFuzz,
}

impl ColumnFunc {
    pub fn for_flags(flags: MobjFlags) -> ColumnFunc {
        let translated = flags.intersects(MobjFlags::TRANSLATION);
        if flags.intersects(MobjFlags::SHADOW | MobjFlags::ALTSHADOW) {
            if translated {
                ColumnFunc::TranslatedFuzz
            } else if flags.contains(MobjFlags::SHADOW) {
                ColumnFunc::Fuzz
            } else {
                ColumnFunc::AltFuzz
            }
        } else if translated {
            ColumnFunc::Translated
        } else {
            ColumnFunc::Plain
        }
    }
}

//
// All drawing to the view buffer is accomplished in this file.
// The other refresh files only know about ccordinates,
//  not the architecture of the frame buffer.
// Conveniently, the frame buffer is a linear one,
//  and we need only the base address,
//  and the total size == width*height*depth/8.,
//
#[derive(Debug)]
pub struct VideoContext {
    pub screen: Vec<u8>,
    pub tables: ColorTables,
    ylookup: Vec<usize>,
    columnofs: Vec<usize>,
    pub viewwindowx: usize,
    pub viewwindowy: usize,
    pub viewheight: i32,
    pub centery: i32,
    pub detailshift: i32,
    fuzzpos: usize,
}

//
// Spectre/Invisibility.
//
const FUZZTABLE: usize = 50;
const FUZZOFF: isize = SCREENWIDTH as isize;

const FUZZOFFSET: [isize; FUZZTABLE] = [
    FUZZOFF,-FUZZOFF,FUZZOFF,-FUZZOFF,FUZZOFF,FUZZOFF,-FUZZOFF,
    FUZZOFF,FUZZOFF,-FUZZOFF,FUZZOFF,FUZZOFF,FUZZOFF,-FUZZOFF,
    FUZZOFF,FUZZOFF,FUZZOFF,-FUZZOFF,-FUZZOFF,-FUZZOFF,-FUZZOFF,
    FUZZOFF,-FUZZOFF,-FUZZOFF,FUZZOFF,FUZZOFF,FUZZOFF,FUZZOFF,-FUZZOFF,
    FUZZOFF,-FUZZOFF,FUZZOFF,FUZZOFF,-FUZZOFF,-FUZZOFF,FUZZOFF,
    FUZZOFF,-FUZZOFF,-FUZZOFF,-FUZZOFF,-FUZZOFF,FUZZOFF,FUZZOFF,
    FUZZOFF,FUZZOFF,-FUZZOFF,FUZZOFF,FUZZOFF,-FUZZOFF,FUZZOFF
];

impl VideoContext {
    pub fn new(tables: ColorTables) -> Self {
        let mut vc = VideoContext {
            screen: vec![0; SCREENWIDTH * SCREENHEIGHT],
            tables,
            ylookup: Vec::new(),
            columnofs: Vec::new(),
            viewwindowx: 0,
            viewwindowy: 0,
            viewheight: SCREENHEIGHT as i32,
            centery: (SCREENHEIGHT / 2) as i32,
            detailshift: 0,
            fuzzpos: 0,
        };
        vc.init_buffer(SCREENWIDTH as i32, SCREENHEIGHT as i32);
        vc
    }

    //
    // init_buffer
    // Creates lookup tables that avoid
    //  multiplies and other hazzles
    //  for getting the framebuffer address
    //  of a pixel to draw.
    //
    pub fn init_buffer(&mut self, width: i32, height: i32) {
        let width = width.clamp(0, SCREENWIDTH as i32) as usize;
        let height = height.clamp(0, SCREENHEIGHT as i32) as usize;

        // Handle resize,
        //  e.g. smaller view windows
        //  with border and/or status bar.
        self.viewwindowx = (SCREENWIDTH - width) >> 1;

        // Column offset. For windows.
        self.columnofs = (0..SCREENWIDTH)
            .map(|i| (self.viewwindowx + i).min(SCREENWIDTH - 1))
            .collect();

        // Samw with base row offset.
        self.viewwindowy = if width == SCREENWIDTH {
            0
        } else {
            ((SCREENHEIGHT as i32 - SBARHEIGHT - height as i32).max(0) >> 1) as usize
        };

        // Preclaculate all row offsets.
        self.ylookup = (0..height)
            .map(|i| (i + self.viewwindowy) * SCREENWIDTH)
            .collect();
        self.viewheight = height as i32;
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.screen[(y + self.viewwindowy) * SCREENWIDTH + self.viewwindowx + x]
    }

    //
    // draw_column
    // Dispatches to the routine picked for the sprite.
    //
    pub fn draw_column(&mut self, func: ColumnFunc, dc: &DrawColumnParams, source: &[u8]) {
        match func {
            ColumnFunc::Plain => self.draw_plain_column(dc, source),
            ColumnFunc::Fuzz => self.draw_fuzz_column(dc, source, false),
            ColumnFunc::AltFuzz => self.draw_fuzz_column(dc, source, true),
            ColumnFunc::Translated => self.draw_translated_column(dc, source),
            ColumnFunc::TranslatedFuzz => self.draw_translated_fuzz_column(dc, source),
        }
    }

    // Clipped row range, or None when nothing is left.
    fn rows(&self, dc: &DrawColumnParams) -> Option<(i32, i32)> {
        let yl = dc.yl.max(0);
        let yh = dc.yh.min(self.ylookup.len() as i32 - 1);
        if yh < yl {
            return None;
        }
        Some((yl, yh))
    }

    // Framebuffer columns covered by view column x,
    //  two of them in low detail.
    fn dest_columns(&self, x: i32) -> Option<(usize, Option<usize>)> {
        if x < 0 {
            return None;
        }
        let x = (x << self.detailshift) as usize;
        let first = *self.columnofs.get(x)?;
        let second = if self.detailshift != 0 {
            self.columnofs.get(x + 1).copied()
        } else {
            None
        };
        Some((first, second))
    }

    fn start_frac(&self, dc: &DrawColumnParams, yl: i32) -> Fixed {
        dc.texturemid
            .wrapping_add(dc.iscale.wrapping_mul(yl - self.centery))
    }

    //
    // A column is a vertical slice/span from a wall texture that,
    //  given the DOOM style restrictions on the view orientation,
    //  will always have constant z depth.
    // Thus a special case loop for very fast rendering can
    //  be used. It has also been used with Wolfenstein 3D.
    //
    fn draw_plain_column(&mut self, dc: &DrawColumnParams, source: &[u8]) {
        let Some((yl, yh)) = self.rows(dc) else {
            return;
        };
        let Some((col, col2)) = self.dest_columns(dc.x) else {
            return;
        };

        // Determine scaling,
        //  which is the only mapping to be done.
        let fracstep = dc.iscale;
        let mut frac = self.start_frac(dc, yl);

        // Inner loop that does the actual texture mapping,
        //  e.g. a DDA-lile scaling.
        for y in yl..=yh {
            // Re-map color indices from wall texture column
            //  using a lighting/special effects LUT.
            let texel = sample(source, frac);
            let pixel = self.tables.colormaps[dc.colormap + texel as usize];

            let row = self.ylookup[y as usize];
            self.screen[row + col] = pixel;
            if let Some(col2) = col2 {
                self.screen[row + col2] = pixel;
            }
            frac = frac.wrapping_add(fracstep);
        }
    }

    //
    // draw_fuzz_column
    // Blends the lit source into the framebuffer through
    //  the translucency table. The alternate form swaps
    //  which side of the blend dominates.
    // Without a translucency table this falls back to
    //  framebuffer postprocessing: pixels are copied from
    //  adjacent rows through a darkening colormap.
    //
    fn draw_fuzz_column(&mut self, dc: &DrawColumnParams, source: &[u8], alt: bool) {
        if self.tables.tinttable.is_none() {
            self.draw_stipple_column(dc);
            return;
        }
        let Some((yl, yh)) = self.rows(dc) else {
            return;
        };
        let Some((col, col2)) = self.dest_columns(dc.x) else {
            return;
        };

        let fracstep = dc.iscale;
        let mut frac = self.start_frac(dc, yl);

        for y in yl..=yh {
            let lit = self.tables.colormaps[dc.colormap + sample(source, frac) as usize];
            let row = self.ylookup[y as usize];
            for c in std::iter::once(col).chain(col2) {
                let dest = self.screen[row + c];
                self.screen[row + c] = self.tint(dest, lit, alt);
            }
            frac = frac.wrapping_add(fracstep);
        }
    }

    //
    // draw_translated_column
    // Used to draw player sprites
    //  with the green colorramp mapped to others.
    //
    fn draw_translated_column(&mut self, dc: &DrawColumnParams, source: &[u8]) {
        let Some((yl, yh)) = self.rows(dc) else {
            return;
        };
        let Some((col, col2)) = self.dest_columns(dc.x) else {
            return;
        };

        let fracstep = dc.iscale;
        let mut frac = self.start_frac(dc, yl);

        // Here we do an additional index re-mapping.
        for y in yl..=yh {
            // Translation tables are used
            //  to map certain colorramps to other ones,
            //  used with PLAY sprites.
            let texel = self.translate(dc, sample(source, frac));
            let pixel = self.tables.colormaps[dc.colormap + texel as usize];

            let row = self.ylookup[y as usize];
            self.screen[row + col] = pixel;
            if let Some(col2) = col2 {
                self.screen[row + col2] = pixel;
            }
            frac = frac.wrapping_add(fracstep);
        }
    }

    fn draw_translated_fuzz_column(&mut self, dc: &DrawColumnParams, source: &[u8]) {
        if self.tables.tinttable.is_none() {
            self.draw_stipple_column(dc);
            return;
        }
        let Some((yl, yh)) = self.rows(dc) else {
            return;
        };
        let Some((col, col2)) = self.dest_columns(dc.x) else {
            return;
        };

        let fracstep = dc.iscale;
        let mut frac = self.start_frac(dc, yl);

        for y in yl..=yh {
            let texel = self.translate(dc, sample(source, frac));
            let lit = self.tables.colormaps[dc.colormap + texel as usize];
            let row = self.ylookup[y as usize];
            for c in std::iter::once(col).chain(col2) {
                let dest = self.screen[row + c];
                self.screen[row + c] = self.tint(dest, lit, false);
            }
            frac = frac.wrapping_add(fracstep);
        }
    }

    //
    // draw_stipple_column
    // Creates a fuzzy image by copying pixels
    //  from adjacent ones above and below.
    // Used with an all black colormap, this
    //  could create the SHADOW effect,
    //  i.e. spectres and invisible players.
    //
    fn draw_stipple_column(&mut self, dc: &DrawColumnParams) {
        // Adjust borders. Low...
        let yl = dc.yl.max(1);
        // .. and high.
        let yh = dc.yh.min(self.viewheight - 2);
        let dc = DrawColumnParams { yl, yh, ..*dc };

        let Some((yl, yh)) = self.rows(&dc) else {
            return;
        };
        let Some((col, col2)) = self.dest_columns(dc.x) else {
            return;
        };

        let last = self.screen.len() - 1;
        for y in yl..=yh {
            let row = self.ylookup[y as usize];
            for c in std::iter::once(col).chain(col2) {
                // Lookup framebuffer, and retrieve
                //  a pixel that is either one row
                //  above or below the current one.
                let dest = row + c;
                let from = dest.saturating_add_signed(FUZZOFFSET[self.fuzzpos]).min(last);
                // colormap #6 is a bit brighter than average
                self.screen[dest] =
                    self.tables.colormaps[6 * COLORMAP_SIZE + self.screen[from] as usize];
            }

            // Clamp table lookup index.
            self.fuzzpos += 1;
            if self.fuzzpos == FUZZTABLE {
                self.fuzzpos = 0;
            }
        }
    }

    fn translate(&self, dc: &DrawColumnParams, texel: u8) -> u8 {
        self.tables
            .translationtables
            .get(dc.translation + texel as usize)
            .copied()
            .unwrap_or(texel)
    }

    fn tint(&self, dest: u8, src: u8, alt: bool) -> u8 {
        let Some(tint) = self.tables.tinttable.as_ref() else {
            return src;
        };
        // the alternate shadow swaps the operands
        let index = if alt {
            dest as usize + ((src as usize) << 8)
        } else {
            ((dest as usize) << 8) + src as usize
        };
        tint[index]
    }
}

// Source texel for a vertical position, the
//  texture height is assumed to be 128.
fn sample(source: &[u8], frac: Fixed) -> u8 {
    source
        .get(((frac >> FRACBITS) & 127) as usize)
        .copied()
        .unwrap_or(0)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn params(x: i32, yl: i32, yh: i32) -> DrawColumnParams {
        DrawColumnParams {
            texturemid: 0,
            yl,
            yh,
            x,
            colormap: 0,
            iscale: FRACUNIT,
            translation: 0,
        }
    }

    #[test]
    fn column_func_precedence() {
        let t = MobjFlags::from_bits_retain(1 << MF_TRANSSHIFT);
        assert_eq!(ColumnFunc::for_flags(MobjFlags::empty()), ColumnFunc::Plain);
        assert_eq!(ColumnFunc::for_flags(MobjFlags::SHADOW), ColumnFunc::Fuzz);
        assert_eq!(ColumnFunc::for_flags(MobjFlags::ALTSHADOW), ColumnFunc::AltFuzz);
        assert_eq!(
            ColumnFunc::for_flags(MobjFlags::SHADOW | MobjFlags::ALTSHADOW),
            ColumnFunc::Fuzz
        );
        assert_eq!(ColumnFunc::for_flags(t), ColumnFunc::Translated);
        assert_eq!(ColumnFunc::for_flags(t | MobjFlags::SHADOW), ColumnFunc::TranslatedFuzz);
        assert_eq!(
            ColumnFunc::for_flags(t | MobjFlags::ALTSHADOW),
            ColumnFunc::TranslatedFuzz
        );
    }

    #[test]
    fn plain_column_writes_only_its_span() {
        let mut vc = VideoContext::new(ColorTables::identity());
        vc.centery = 0;
        let source: Vec<u8> = (1..=20).collect();
        vc.draw_column(ColumnFunc::Plain, &params(5, 2, 4), &source);

        assert_eq!(vc.pixel(5, 1), 0);
        assert_eq!(vc.pixel(5, 2), 3);
        assert_eq!(vc.pixel(5, 3), 4);
        assert_eq!(vc.pixel(5, 4), 5);
        assert_eq!(vc.pixel(5, 5), 0);
        assert_eq!(vc.pixel(6, 3), 0);
    }

    #[test]
    fn low_detail_doubles_columns() {
        let mut vc = VideoContext::new(ColorTables::identity());
        vc.centery = 0;
        vc.detailshift = 1;
        vc.draw_column(ColumnFunc::Plain, &params(3, 0, 0), &[9]);
        assert_eq!(vc.pixel(6, 0), 9);
        assert_eq!(vc.pixel(7, 0), 9);
        assert_eq!(vc.pixel(3, 0), 0);
    }

    #[test]
    fn rows_are_clipped_to_the_view() {
        let mut vc = VideoContext::new(ColorTables::identity());
        vc.init_buffer(SCREENWIDTH as i32, 10);
        vc.centery = 0;
        vc.draw_column(ColumnFunc::Plain, &params(0, -5, 50), &[1; 128]);
        assert_eq!(vc.pixel(0, 9), 1);
        assert_eq!(vc.screen[10 * SCREENWIDTH], 0);
    }

    #[test]
    fn translated_column_remaps_source() {
        let mut tables = ColorTables::identity();
        tables.translationtables[256 + 4] = 77;
        let mut vc = VideoContext::new(tables);
        vc.centery = 0;
        let dc = DrawColumnParams {
            translation: 256,
            ..params(1, 0, 0)
        };
        vc.draw_column(ColumnFunc::Translated, &dc, &[4]);
        assert_eq!(vc.pixel(1, 0), 77);
    }

    #[test]
    fn fuzz_blends_through_tint_table() {
        let mut tables = ColorTables::identity();
        let mut tint = vec![0u8; 256 * 256];
        tint[3 + (8 << 8)] = 100;
        tint[(3 << 8) + 8] = 200;
        tables.tinttable = Some(tint);
        let mut vc = VideoContext::new(tables);
        vc.centery = 0;
        vc.screen[0] = 3;
        vc.screen[1] = 3;

        vc.draw_column(ColumnFunc::Fuzz, &params(0, 0, 0), &[8]);
        vc.draw_column(ColumnFunc::AltFuzz, &params(1, 0, 0), &[8]);
        assert_eq!(vc.pixel(0, 0), 200);
        assert_eq!(vc.pixel(1, 0), 100);
    }

    #[test]
    fn translated_fuzz_blends_like_fuzz() {
        let mut tables = ColorTables::identity();
        tables.translationtables[256 + 4] = 8;
        let mut tint = vec![0u8; 256 * 256];
        tint[3 + (8 << 8)] = 100;
        tint[(3 << 8) + 8] = 200;
        tables.tinttable = Some(tint);
        let mut vc = VideoContext::new(tables);
        vc.centery = 0;
        vc.screen[0] = 3;
        vc.screen[1] = 3;

        let dc = DrawColumnParams {
            translation: 256,
            ..params(1, 0, 0)
        };
        vc.draw_column(ColumnFunc::Fuzz, &params(0, 0, 0), &[8]);
        vc.draw_column(ColumnFunc::TranslatedFuzz, &dc, &[4]);
        assert_eq!(vc.pixel(1, 0), 200);
        assert_eq!(vc.pixel(1, 0), vc.pixel(0, 0));
    }

    #[test]
    fn stipple_fallback_keeps_border_rows() {
        let mut vc = VideoContext::new(ColorTables::identity());
        vc.screen.iter_mut().for_each(|p| *p = 5);
        vc.draw_column(ColumnFunc::Fuzz, &params(0, 0, SCREENHEIGHT as i32 - 1), &[0]);
        // identity colormap 6 copies the neighbour through unchanged
        assert_eq!(vc.pixel(0, 0), 5);
        assert_eq!(vc.pixel(0, 100), 5);
    }

    #[test]
    fn view_window_is_centered_above_status_bar() {
        let mut vc = VideoContext::new(ColorTables::identity());
        vc.init_buffer(160, 80);
        assert_eq!(vc.viewwindowx, 80);
        assert_eq!(vc.viewwindowy, ((200 - 39 - 80) >> 1) as usize);
        assert_eq!(vc.viewheight, 80);
    }
}
