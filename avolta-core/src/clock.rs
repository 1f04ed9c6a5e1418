// Avolta Publications - content backend for the Avolta corporate website
// Copyright (C) 2025 Avolta Web Team
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Wall clock at the precision the store keeps.
//!
//! Instants are persisted with microsecond resolution, so every instant that
//! enters the domain is truncated to microseconds first. A record then
//! compares equal before and after a round trip through the database.

use chrono::{DateTime, SubsecRound, Utc};

/// Digits of sub-second precision kept on every stored instant
pub const PRECISION_DIGITS: u16 = 6;

pub fn now() -> DateTime<Utc> {
    truncate(Utc::now())
}

pub fn truncate(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(PRECISION_DIGITS)
}
