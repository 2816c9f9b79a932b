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
//	Refresh settings, read from a TOML file.
//
//-----------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::r_things::MAXVISSPRITES;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    // 3..=10 shrink the view, 11 is full screen
    pub screenblocks: i32,
    // 0 high, 1 low
    pub detail: i32,
    // sprites missing from a reduced asset set are allowed
    pub shareware: bool,
    pub level_use_full_bright: bool,
    pub max_vissprites: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            screenblocks: 10,
            detail: 0,
            shareware: false,
            level_use_full_bright: true,
            max_vissprites: MAXVISSPRITES,
        }
    }
}

impl RenderConfig {
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(3..=11).contains(&self.screenblocks) {
            return Err(ConfigError::Invalid(format!(
                "screenblocks {} not in 3..=11",
                self.screenblocks
            )));
        }
        if !(0..=1).contains(&self.detail) {
            return Err(ConfigError::Invalid(format!(
                "detail {} not 0 or 1",
                self.detail
            )));
        }
        if self.max_vissprites == 0 {
            return Err(ConfigError::Invalid("max_vissprites must be positive".into()));
        }
        Ok(())
    }
}
