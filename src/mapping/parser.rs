//! Grammar for the `;a-b;c-d;` index-pair strings used by `anime-list.xml`.
//!
//! Both `<mapping>` bodies (AniDB index to TvDB index) and `<before>` bodies
//! (special index to following standard index) use it. A segment that is not
//! exactly two unsigned integers joined by `-` is dropped on its own; the rest
//! of the string still parses.

use nom::{
    IResult, Parser,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res},
    sequence::separated_pair,
};

fn index(input: &str) -> IResult<&str, i32> {
    map_res(digit1, |digits: &str| digits.parse::<i32>()).parse(input)
}

fn index_pair(input: &str) -> IResult<&str, (i32, i32)> {
    separated_pair(index, char('-'), index).parse(input)
}

/// Parses every well-formed `a-b` segment of a `;`-delimited list.
#[must_use]
pub fn parse_index_pairs(input: &str) -> Vec<(i32, i32)> {
    input
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            all_consuming(index_pair)
                .parse(segment)
                .ok()
                .map(|(_, pair)| pair)
        })
        .collect()
}
