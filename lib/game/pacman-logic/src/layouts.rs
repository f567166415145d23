/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! Built-in layouts.

/// A narrow corridor with one ghost and a handful of pellets.
pub const TEST_CLASSIC: &str = "
%%%%%
% . %
%.G.%
% . %
%. .%
%   %
%  .%
%   %
%P .%
%%%%%
";

/// A small maze with a single pellet and no ghosts, for path finding.
pub const TINY_MAZE: &str = "
%%%%%%%
%    P%
% %%% %
%  %  %
%%   %%
%. %%%%
%%%%%%%
";

/// Two ghosts close to Pacman. Only a deep enough search avoids being cornered.
pub const MINIMAX_CLASSIC: &str = "
%%%%%%%%%
%.P    G%
% %.%G%%%
%G    %%%
%%%%%%%%%
";

/// An open room with food spread around and one ghost.
pub const OPEN_ROOM: &str = "
%%%%%%%%%%
%P . .  .%
% .    . %
%   %%   %
% .    . %
%.  . . G%
%%%%%%%%%%
";

/// Look up a built-in layout by name.
pub fn by_name(name: &str) -> Option<&'static str> {
    match name {
        "testClassic" | "test_classic" => Some(TEST_CLASSIC),
        "tinyMaze" | "tiny_maze" => Some(TINY_MAZE),
        "minimaxClassic" | "minimax_classic" => Some(MINIMAX_CLASSIC),
        "openRoom" | "open_room" => Some(OPEN_ROOM),
        _ => None,
    }
}
