// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Plain-text rendering of the giveaway cards.

use std::fmt;

use lootdrop_abi::GiveawayId;

use crate::active::GiveawayView;

pub const EMPTY_LIST: &str = "No active giveaways... yet.";

/// Renders `giveaways` as of Unix time `now`; `joining` holds the ids with a
/// join in flight.
pub fn render_giveaways(giveaways: &[GiveawayView], joining: &[GiveawayId], now: u64) -> String {
    GiveawayList {
        giveaways,
        joining,
        now,
    }
    .to_string()
}

struct GiveawayList<'a> {
    giveaways: &'a [GiveawayView],
    joining: &'a [GiveawayId],
    now: u64,
}

impl fmt::Display for GiveawayList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Active Giveaways")?;
        writeln!(f)?;
        if self.giveaways.is_empty() {
            return writeln!(f, "{EMPTY_LIST}");
        }
        for giveaway in self.giveaways {
            let joining = self.joining.contains(&giveaway.id);
            write_card(f, giveaway, joining, self.now)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

fn write_card(
    f: &mut fmt::Formatter<'_>,
    giveaway: &GiveawayView,
    joining: bool,
    now: u64,
) -> fmt::Result {
    writeln!(f, "{}", giveaway.name)?;
    writeln!(f, "  Prize: {} ETH", giveaway.prize_amount)?;
    writeln!(
        f,
        "  Participants: {}/{}",
        giveaway.participants, giveaway.max_participants
    )?;
    match giveaway.end_timestamp.checked_sub(now) {
        Some(remaining) if remaining > 0 => writeln!(f, "  Ends In: {remaining}s")?,
        _ => writeln!(f, "  Ended")?,
    }
    writeln!(f, "  Winners: {}", giveaway.num_winners)?;

    let join = if joining { "Joining..." } else { "Join Giveaway" };
    write!(f, "  [{join}] [Show Participants]")?;
    if giveaway.is_creator {
        let finalize = if giveaway.finalizing {
            "Finalizing..."
        } else {
            "Finalize Giveaway"
        };
        write!(f, " [{finalize}]")?;
    }
    writeln!(f)?;

    if giveaway.show_participants {
        writeln!(f, "  Participants:")?;
        for participant in &giveaway.participant_list {
            writeln!(f, "    {participant}")?;
        }
    }
    Ok(())
}
