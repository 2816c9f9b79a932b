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
//	Headless refresh of a ring of things, written out as a PGM.
//
//-----------------------------------------------------------------------------

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use thiserror::Error;

use headless_things::defs::*;
use headless_things::r_data::{encode_patch, COLORMAP_SIZE, WAD_NUMCOLORMAPS};
use headless_things::r_things::{add_sprites, draw_masked};
use headless_things::tables::{finecosine, finesine};
use headless_things::{ConfigError, RenderConfig, RenderContext, RenderError, Wad, WadError};

const DEMO_SPRITE: &str = "DEMO";
const DEMO_WEAPON: &str = "DWPN";

/// Render one frame of things without walls
#[derive(Parser)]
#[command(version, about = "Headless software refresh of sprites")]
struct Cli {
    /// IWAD or PWAD to take sprites from; a built in lump set is used if absent
    wad: Option<PathBuf>,

    /// TOML file with refresh settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sprite names to load, the first one is placed around the viewer
    #[arg(long, value_delimiter = ',')]
    sprites: Vec<String>,

    /// Number of things in the ring
    #[arg(long, default_value_t = 12)]
    things: usize,

    /// Where to write the view
    #[arg(long, default_value = "things.pgm")]
    out: PathBuf,
}

#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Wad(#[from] WadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("couldn't write {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

//
// Light tables fading every color index towards black.
//
fn demo_colormap() -> Vec<u8> {
    let mut colormap = Vec::with_capacity(WAD_NUMCOLORMAPS * COLORMAP_SIZE);
    for map in 0..WAD_NUMCOLORMAPS {
        let level = NUMCOLORMAPS.saturating_sub(map);
        colormap.extend((0..COLORMAP_SIZE).map(|c| (c * level / NUMCOLORMAPS) as u8));
    }
    colormap
}

// A box with a bright stripe down the left side, so mirrored
//  rotations can be told apart.
fn demo_patch(width: usize, height: u8, shade: u8) -> Vec<u8> {
    let columns: Vec<Vec<(u8, Vec<u8>)>> = (0..width)
        .map(|x| {
            let color = if x < width / 4 { 255 } else { shade };
            vec![(0, vec![color; height as usize])]
        })
        .collect();
    encode_patch((width / 2) as i16, height as i16, height as i16, &columns)
}

//
// demo_wad
// Eight rotations of one frame, three of them mirrored,
//  plus a weapon overlay.
//
fn demo_wad() -> Wad {
    let mut wad = Wad::new();
    wad.push_lump("COLORMAP", demo_colormap());
    wad.push_lump("S_START", Vec::new());
    for (i, name) in ["DEMOA1", "DEMOA2A8", "DEMOA3A7", "DEMOA4A6", "DEMOA5"].iter().enumerate() {
        wad.push_lump(name, demo_patch(24, 48, 96 + 32 * i as u8));
    }
    wad.push_lump("DWPNA0", encode_patch(16, 0, 40, &vec![vec![(0, vec![200; 40])]; 32]));
    wad.push_lump("S_END", Vec::new());
    wad
}

//
// ring_of_things
// Spread evenly around the origin, each one turned a
//  little further than the last.
//
fn ring_of_things(count: usize) -> Vec<Mobj> {
    (0..count)
        .map(|i| {
            let fine = i * FINEANGLES / count.max(1);
            let radius = 160 + 16 * (i as i32 % 4);
            Mobj {
                x: radius * finecosine(fine),
                y: radius * finesine(fine),
                angle: (i as u32).wrapping_mul(ANG45),
                frame: if i % 3 == 0 { FF_FULLBRIGHT } else { 0 },
                ..Mobj::default()
            }
        })
        .collect()
}

fn write_pgm(rc: &RenderContext, path: &Path) -> Result<(), DemoError> {
    let mut out = format!("P5\n{} {}\n255\n", SCREENWIDTH, SCREENHEIGHT).into_bytes();
    out.extend_from_slice(&rc.vc.screen);
    std::fs::write(path, out).map_err(|source| DemoError::Output {
        path: path.display().to_string(),
        source,
    })
}

fn run(cli: &Cli) -> Result<(), DemoError> {
    let config = match &cli.config {
        Some(path) => RenderConfig::load_from_file(&path.to_string_lossy())?,
        None => RenderConfig::default(),
    };

    let (wad, mut names) = match &cli.wad {
        Some(path) => (Wad::open(path)?, vec!["PLAY".to_string()]),
        None => {
            info!("no wad given, using the built in sprites");
            (demo_wad(), vec![DEMO_SPRITE.to_string(), DEMO_WEAPON.to_string()])
        }
    };
    if !cli.sprites.is_empty() {
        names = cli.sprites.clone();
    }

    let namelist: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut rc = RenderContext::new(Arc::new(wad), &config, &namelist)?;

    for sprdef in rc.tc.sprites.iter() {
        info!("{}: {} frames", sprdef.name, sprdef.numframes());
    }

    let things = ring_of_things(cli.things);
    let mut sectors = vec![Sector {
        lightlevel: 176,
        validcount: 0,
        thinglist: (0..things.len()).collect(),
    }];

    let mut player = Player {
        viewz: 41 * FRACUNIT,
        ..Player::default()
    };
    if let Some(weapon) = rc.tc.sprites.iter().position(|s| s.name == DEMO_WEAPON) {
        player.psprites[0] = PspDef {
            state: Some(PspState { sprite: weapon, frame: 0 }),
            sx: 160 * FRACUNIT,
            sy: 130 * FRACUNIT,
        };
    }

    rc.clear_frame();
    rc.setup_frame(&player, &sectors);
    add_sprites(&mut rc, &mut sectors[0], &things)?;
    info!(
        "{} of {} things projected, {} over the limit",
        rc.tc.vissprites.len(),
        things.len(),
        rc.tc.vissprites.dropped()
    );
    draw_masked(&mut rc)?;

    write_pgm(&rc, &cli.out)?;
    info!("wrote {}", cli.out.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
