/// Fixed-value trade metadata shared by entries, filters and storage.
///
/// Every type here is stored as its wire string (TEXT column) and parsed back
/// with `FromStr`; an unknown string is an `UnknownValue`, which validation
/// turns into the field-specific error.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A string that is not one of a type's fixed values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! fixed_values {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownValue {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

fixed_values! {
    /// Trading session time zone
    TradingSession, "trading session" {
        Asia => "asia",
        London => "london",
        NewYork => "new_york",
    }
}

fixed_values! {
    TradeType, "trade type" {
        Swing => "swing",
        Intraday => "intraday",
    }
}

fixed_values! {
    TradeDirection, "trade direction" {
        Buy => "buy",
        Sell => "sell",
    }
}

fixed_values! {
    /// Order type used to open the position
    EntryType, "entry type" {
        Market => "market",
        Limit => "limit",
    }
}

fixed_values! {
    /// Trade outcome: take profit, stop loss or break even
    TradeResult, "trade result" {
        TakeProfit => "TP",
        StopLoss => "SL",
        BreakEven => "BE",
    }
}

fixed_values! {
    TimeFrame, "timeframe" {
        M1 => "1M",
        M5 => "5M",
        M15 => "15M",
        M30 => "30M",
        H1 => "1H",
        H4 => "4H",
        D1 => "1D",
        W1 => "1W",
        Mo1 => "1MO",
    }
}

fixed_values! {
    /// Forex pairs a trade can be recorded against
    CurrencyPair, "currency pair" {
        // Majors
        EurUsd => "EURUSD",
        GbpUsd => "GBPUSD",
        UsdJpy => "USDJPY",
        UsdChf => "USDCHF",
        AudUsd => "AUDUSD",
        UsdCad => "USDCAD",
        NzdUsd => "NZDUSD",
        // Minors
        EurGbp => "EURGBP",
        EurJpy => "EURJPY",
        GbpJpy => "GBPJPY",
        EurChf => "EURCHF",
        EurAud => "EURAUD",
        EurCad => "EURCAD",
        GbpChf => "GBPCHF",
        GbpAud => "GBPAUD",
        GbpCad => "GBPCAD",
        // Exotics
        UsdTry => "USDTRY",
        UsdMxn => "USDMXN",
        UsdZar => "USDZAR",
        UsdNok => "USDNOK",
        UsdSek => "USDSEK",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_strings_round_trip_through_from_str() {
        for pair in CurrencyPair::ALL {
            assert_eq!(pair.as_str().parse::<CurrencyPair>().unwrap(), *pair);
        }
        for tf in TimeFrame::ALL {
            assert_eq!(tf.as_str().parse::<TimeFrame>().unwrap(), *tf);
        }
        assert_eq!(CurrencyPair::ALL.len(), 21);
        assert_eq!(TimeFrame::ALL.len(), 9);
    }

    #[test]
    fn unknown_values_are_rejected_with_kind() {
        let err = "XAUUSD".parse::<CurrencyPair>().unwrap_err();
        assert_eq!(err.kind, "currency pair");
        assert_eq!(err.value, "XAUUSD");

        assert!("tokyo".parse::<TradingSession>().is_err());
        assert!("tp".parse::<TradeResult>().is_err(), "results are case-sensitive");
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&TradingSession::NewYork).unwrap();
        assert_eq!(json, "\"new_york\"");
        let result: TradeResult = serde_json::from_str("\"BE\"").unwrap();
        assert_eq!(result, TradeResult::BreakEven);
    }
}
