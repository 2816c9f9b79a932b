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
//	Fixed point implementation.
//
//-----------------------------------------------------------------------------


use crate::defs::*;

pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    (((a as i64) * (b as i64)) >> FRACBITS) as Fixed
}


//
// fixed_div
// Saturates instead of overflowing, so a zero
//  divisor yields MAXINT or MININT.
//
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if (a.unsigned_abs() >> 14) >= b.unsigned_abs() {
        return if (a ^ b) < 0 { MININT } else { MAXINT };
    }
    fixed_div2(a, b)
}


fn fixed_div2(a: Fixed, b: Fixed) -> Fixed {
    // fixed_div has already ruled out b == 0 and any quotient
    //  that does not fit.
    let c: i64 = ((a as i64) << FRACBITS) / (b as i64);
    c as Fixed
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_is_sixteen_sixteen() {
        assert_eq!(fixed_mul(2 * FRACUNIT, 3 * FRACUNIT), 6 * FRACUNIT);
        assert_eq!(fixed_mul(FRACUNIT / 2, -4 * FRACUNIT), -2 * FRACUNIT);
    }

    #[test]
    fn div_handles_ordinary_quotients() {
        assert_eq!(fixed_div(6 * FRACUNIT, 3 * FRACUNIT), 2 * FRACUNIT);
        assert_eq!(fixed_div(FRACUNIT, 4 * FRACUNIT), FRACUNIT / 4);
        assert_eq!(fixed_div(-FRACUNIT, 2 * FRACUNIT), -FRACUNIT / 2);
    }

    #[test]
    fn div_by_zero_saturates() {
        assert_eq!(fixed_div(FRACUNIT, 0), MAXINT);
        assert_eq!(fixed_div(-FRACUNIT, 0), MININT);
        assert_eq!(fixed_div(MININT, 1), MININT);
    }
}
