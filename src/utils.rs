use crate::engine::{Dimensions, State, Tile, EMPTY_TILE};
use crate::error::SearchError;

/// A parsed board together with the grid shape its rows describe.
pub type Board = (State, Dimensions);

fn parse_tile(token: &str, row: usize, col: usize) -> Result<Tile, SearchError> {
    match token {
        "." | "_" => Ok(EMPTY_TILE),
        _ => token.parse::<Tile>().map_err(|_| {
            SearchError::Parse(format!(
                "Unrecognized tile '{}' in row {} col {}",
                token, row, col
            ))
        }),
    }
}

/// Parses an array of string slices into a board.
///
/// Each string slice is one row, starting from the top. Tiles are integers separated by
/// whitespace and/or commas; `0`, `.` and `_` all denote the empty slot. The width is
/// taken from the first row and every other row must match it.
///
/// The result is not checked for being a permutation; [`Goal::new`] and the solver do
/// that when the board is used.
///
/// [`Goal::new`]: crate::engine::Goal::new
///
/// # Examples
/// ```
/// use sliding_puzzle_solver::utils::board_from_str_array;
///
/// let (state, dimensions) = board_from_str_array(&["1 . 2", "3,4,5"]).unwrap();
/// assert_eq!(dimensions.to_string(), "3x2");
/// assert_eq!(state.tiles(), &[1, 0, 2, 3, 4, 5]);
///
/// assert!(board_from_str_array(&["1 2", "3"]).is_err());
/// assert!(board_from_str_array(&["1 x"]).is_err());
/// ```
pub fn board_from_str_array(rows: &[&str]) -> Result<Board, SearchError> {
    if rows.is_empty() {
        return Err(SearchError::Parse("Board has no rows".to_string()));
    }

    let mut tiles = Vec::new();
    let mut width = 0;
    for (r, row) in rows.iter().enumerate() {
        let row_tiles = row
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .enumerate()
            .map(|(c, token)| parse_tile(token, r, c))
            .collect::<Result<Vec<_>, _>>()?;

        if r == 0 {
            width = row_tiles.len();
        } else if row_tiles.len() != width {
            return Err(SearchError::Parse(format!(
                "Row {} has {} tiles, expected {}",
                r,
                row_tiles.len(),
                width
            )));
        }
        tiles.extend(row_tiles);
    }

    let dimensions = Dimensions::new(width, rows.len())?;
    Ok((State::new(tiles), dimensions))
}

/// Parses every board in `text`. Boards are separated by one or more blank lines.
pub fn boards_from_str(text: &str) -> Result<Vec<Board>, SearchError> {
    let mut boards = Vec::new();
    let mut rows: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !rows.is_empty() {
                boards.push(board_from_str_array(&rows)?);
                rows.clear();
            }
            continue;
        }
        rows.push(line);
    }
    if !rows.is_empty() {
        boards.push(board_from_str_array(&rows)?);
    }
    Ok(boards)
}
