//! Scoring heuristics for the decision-tree search.
//!
//! A `Scoring` pairs a leaf metric (win share, coins, coin lead) with the rule
//! used to fold child scores into their parent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::{GameState, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scoring {
    MaxPercent,
    MinPercent,
    MinMaxPercent,
    MaxValue,
    MinValue,
    MinMaxValue,
    MaxValueDifference,
    MinMaxValueDifference,
}

pub const ALL_SCORINGS: [Scoring; 8] = [
    Scoring::MaxPercent,
    Scoring::MinPercent,
    Scoring::MinMaxPercent,
    Scoring::MaxValue,
    Scoring::MinValue,
    Scoring::MinMaxValue,
    Scoring::MaxValueDifference,
    Scoring::MinMaxValueDifference,
];

/// Leaf quantity measured on a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    /// 1/k when among k leaders, else 0.
    WinShare,
    /// 1 when among the leaders, else 0.
    NotLosing,
    Coins,
    /// Own coins minus the poorest opponent's.
    CoinLead,
}

/// How child scores combine into the parent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fold {
    Max,
    Min,
    Mean,
    /// Max where the root player moves, min elsewhere.
    MinMax,
}

impl Scoring {
    fn metric(self) -> Metric {
        match self {
            Scoring::MaxPercent | Scoring::MinMaxPercent => Metric::WinShare,
            Scoring::MinPercent => Metric::NotLosing,
            Scoring::MaxValue | Scoring::MinValue | Scoring::MinMaxValue => Metric::Coins,
            Scoring::MaxValueDifference | Scoring::MinMaxValueDifference => Metric::CoinLead,
        }
    }

    fn fold(self) -> Fold {
        match self {
            Scoring::MaxPercent | Scoring::MinPercent => Fold::Mean,
            Scoring::MaxValue | Scoring::MaxValueDifference => Fold::Max,
            Scoring::MinValue => Fold::Min,
            Scoring::MinMaxPercent | Scoring::MinMaxValue | Scoring::MinMaxValueDifference => {
                Fold::MinMax
            }
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Scoring::MaxPercent => "max-percent",
            Scoring::MinPercent => "min-percent",
            Scoring::MinMaxPercent => "min-max-percent",
            Scoring::MaxValue => "max-value",
            Scoring::MinValue => "min-value",
            Scoring::MinMaxValue => "min-max-value",
            Scoring::MaxValueDifference => "max-value-difference",
            Scoring::MinMaxValueDifference => "min-max-value-difference",
        }
    }

    /// Combines the scores of a node's children.
    ///
    /// `root_moves` says whether the root player decides at this node.
    /// Returns None when there are no children.
    pub fn combine(self, root_moves: bool, children: &[f64]) -> Option<f64> {
        if children.is_empty() {
            return None;
        }
        let max = || children.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = || children.iter().copied().fold(f64::INFINITY, f64::min);
        Some(match self.fold() {
            Fold::Max => max(),
            Fold::Min => min(),
            Fold::Mean => children.iter().sum::<f64>() / children.len() as f64,
            Fold::MinMax if root_moves => max(),
            Fold::MinMax => min(),
        })
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scoring {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_SCORINGS
            .iter()
            .copied()
            .find(|sc| sc.name() == s)
            .ok_or_else(|| format!("unknown scoring '{s}'"))
    }
}

/// Scores `state` from `player`'s point of view. Unknown players score 0.
pub fn score_state(state: &GameState, player: PlayerId, scoring: Scoring) -> f64 {
    let Ok(me) = state.player(player) else {
        return 0.0;
    };
    match scoring.metric() {
        Metric::WinShare => {
            let leaders = state.winners();
            if leaders.contains(&player) {
                1.0 / leaders.len() as f64
            } else {
                0.0
            }
        }
        Metric::NotLosing => {
            if state.winners().contains(&player) {
                1.0
            } else {
                0.0
            }
        }
        Metric::Coins => me.coins as f64,
        Metric::CoinLead => {
            let poorest = state
                .players
                .iter()
                .filter(|p| p.id != player)
                .map(|p| p.coins)
                .min()
                .unwrap_or(0);
            (me.coins - poorest) as f64
        }
    }
}
