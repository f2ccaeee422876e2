use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Entry;
use crate::types::TradeResult;

/// Performance summary of a journal's live entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_trades: i64,
    pub wins: i64,
    pub losses: i64,
    pub break_even: i64,
    pub win_rate: f64,
    pub total_realized: Decimal,
    pub avg_risk_reward: Decimal,
}

impl Statistics {
    /// Assemble from aggregate values. `win_rate` is derived here and is
    /// exactly 0.0 for an empty journal.
    pub fn from_aggregates(
        total_trades: i64,
        wins: i64,
        losses: i64,
        break_even: i64,
        total_realized: Decimal,
        avg_risk_reward: Decimal,
    ) -> Self {
        let win_rate = if total_trades > 0 {
            wins as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_trades,
            wins,
            losses,
            break_even,
            win_rate,
            total_realized,
            avg_risk_reward,
        }
    }

    pub fn empty() -> Self {
        Self::from_aggregates(0, 0, 0, 0, Decimal::ZERO, Decimal::ZERO)
    }

    /// Single pass over already-filtered live entries
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let (mut total, mut wins, mut losses, mut break_even) = (0i64, 0i64, 0i64, 0i64);
        let mut realized = Decimal::ZERO;
        let mut rr_sum = Decimal::ZERO;

        for entry in entries {
            total += 1;
            match entry.result {
                TradeResult::TakeProfit => wins += 1,
                TradeResult::StopLoss => losses += 1,
                TradeResult::BreakEven => break_even += 1,
            }
            realized += entry.realized;
            rr_sum += entry.max_rr;
        }

        let avg_rr = if total > 0 {
            rr_sum / Decimal::from(total)
        } else {
            Decimal::ZERO
        };
        Self::from_aggregates(total, wins, losses, break_even, realized, avg_rr)
    }
}
