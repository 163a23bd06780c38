//! Derived metrics over holdings and the portfolio as a whole.
//!
//! Per-holding figures (invested, market value, P&L) are simple products;
//! the portfolio summary adds net worth, per-class allocation, top movers,
//! the largest position, and a single precedence-chosen alert.

use serde::{Deserialize, Serialize};

use crate::merge::MergedHolding;
use crate::models::Holding;

/// Digital-asset allocation above this share of net worth trips the first
/// alert in the chain.
pub const DIGITAL_CONCENTRATION_LIMIT_PCT: f64 = 45.0;
/// Cash allocation below this share trips the low-liquidity alert.
pub const LOW_LIQUIDITY_LIMIT_PCT: f64 = 12.0;
/// A single position above this share of net worth trips the
/// concentration-by-position alert.
pub const POSITION_CONCENTRATION_LIMIT_PCT: f64 = 28.0;
/// How many movers the summary surfaces.
pub const TOP_MOVER_COUNT: usize = 3;

/// Money figures derived from one position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingMetrics {
    /// quantity * avg price
    pub invested: f64,
    /// quantity * current price
    pub market_value: f64,
    /// market value - invested
    pub pnl: f64,
    /// pnl / invested * 100, or 0 when nothing was invested
    pub pnl_pct: f64,
}

impl HoldingMetrics {
    pub fn new(quantity: f64, avg_price: f64, current_price: f64) -> Self {
        let invested = quantity * avg_price;
        let market_value = quantity * current_price;
        let pnl = market_value - invested;
        let pnl_pct = if invested > 0.0 {
            pnl / invested * 100.0
        } else {
            0.0
        };

        Self {
            invested,
            market_value,
            pnl,
            pnl_pct,
        }
    }

    pub fn for_holding(holding: &Holding) -> Self {
        Self::new(holding.quantity, holding.avg_price, holding.current_price)
    }

    pub fn for_merged(merged: &MergedHolding) -> Self {
        Self::new(merged.quantity, merged.avg_price, merged.current_price)
    }
}

/// A cash account balance (checking, savings, broker cash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashAccount {
    pub name: String,
    pub balance: f64,
}

/// An equity position already valued by the brokerage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPosition {
    pub symbol: String,
    pub market_value: f64,
    pub change_pct: f64,
}

/// A symbol with its percentage change, as surfaced in the movers row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub symbol: String,
    pub change_pct: f64,
}

/// Everything the summary is computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub cash_accounts: Vec<CashAccount>,
    pub digital_holdings: Vec<Holding>,
    pub equity_positions: Vec<EquityPosition>,
    /// Quoted symbols shown as movers when the portfolio holds nothing.
    pub watchlist: Vec<Mover>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Cash,
    Digital,
    Equity,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Cash => "cash",
            AssetClass::Digital => "digital",
            AssetClass::Equity => "equity",
        }
    }
}

/// One asset class's share of net worth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub class: AssetClass,
    pub total: f64,
    pub pct: f64,
}

/// The single position with the greatest market value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargestPosition {
    pub symbol: String,
    pub market_value: f64,
    pub share_pct: f64,
}

/// Exactly one alert is surfaced per summary, chosen by a fixed precedence
/// chain, not by severity magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    /// Digital assets exceed their allocation limit.
    DigitalConcentration { pct: f64 },
    /// Cash has fallen below the liquidity floor.
    LowLiquidity { pct: f64 },
    /// One position dominates net worth.
    PositionConcentration { symbol: String, share_pct: f64 },
    /// Nothing to flag.
    Balanced,
}

/// Portfolio-level aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub net_worth: f64,
    pub allocations: Vec<Allocation>,
    pub top_movers: Vec<Mover>,
    pub largest_position: Option<LargestPosition>,
    pub alert: Alert,
}

/// Computes the portfolio summary.
///
/// Allocation and share percentages divide by net worth, substituting 1 as
/// the divisor when net worth is zero so empty portfolios report 0%.
pub fn summarize(portfolio: &Portfolio) -> PortfolioSummary {
    let cash_total: f64 = portfolio.cash_accounts.iter().map(|a| a.balance).sum();
    let digital_total: f64 = portfolio
        .digital_holdings
        .iter()
        .map(|h| HoldingMetrics::for_holding(h).market_value)
        .sum();
    let equity_total: f64 = portfolio.equity_positions.iter().map(|p| p.market_value).sum();

    let net_worth = cash_total + digital_total + equity_total;
    let divisor = if net_worth == 0.0 { 1.0 } else { net_worth };

    let allocations = vec![
        Allocation {
            class: AssetClass::Cash,
            total: cash_total,
            pct: cash_total / divisor * 100.0,
        },
        Allocation {
            class: AssetClass::Digital,
            total: digital_total,
            pct: digital_total / divisor * 100.0,
        },
        Allocation {
            class: AssetClass::Equity,
            total: equity_total,
            pct: equity_total / divisor * 100.0,
        },
    ];

    let top_movers = top_movers(portfolio);
    let largest_position = largest_position(portfolio, divisor);
    let alert = pick_alert(&allocations, largest_position.as_ref());

    PortfolioSummary {
        net_worth,
        allocations,
        top_movers,
        largest_position,
        alert,
    }
}

/// Holdings and equity positions ranked by descending absolute change; falls
/// back to the watchlist when the portfolio holds nothing.
fn top_movers(portfolio: &Portfolio) -> Vec<Mover> {
    let mut movers: Vec<Mover> = portfolio
        .digital_holdings
        .iter()
        .map(|h| Mover {
            symbol: h.symbol.clone(),
            change_pct: HoldingMetrics::for_holding(h).pnl_pct,
        })
        .chain(portfolio.equity_positions.iter().map(|p| Mover {
            symbol: p.symbol.clone(),
            change_pct: p.change_pct,
        }))
        .collect();

    if movers.is_empty() {
        movers = portfolio.watchlist.clone();
    }

    movers.sort_by(|a, b| b.change_pct.abs().total_cmp(&a.change_pct.abs()));
    movers.truncate(TOP_MOVER_COUNT);
    movers
}

fn largest_position(portfolio: &Portfolio, divisor: f64) -> Option<LargestPosition> {
    let digital = portfolio.digital_holdings.iter().map(|h| {
        (
            h.symbol.clone(),
            HoldingMetrics::for_holding(h).market_value,
        )
    });
    let equities = portfolio
        .equity_positions
        .iter()
        .map(|p| (p.symbol.clone(), p.market_value));

    digital
        .chain(equities)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(symbol, market_value)| LargestPosition {
            symbol,
            market_value,
            share_pct: market_value / divisor * 100.0,
        })
}

/// First matching rule wins; later rules are not consulted.
fn pick_alert(allocations: &[Allocation], largest: Option<&LargestPosition>) -> Alert {
    let pct_of = |class: AssetClass| {
        allocations
            .iter()
            .find(|a| a.class == class)
            .map(|a| a.pct)
            .unwrap_or(0.0)
    };

    let digital_pct = pct_of(AssetClass::Digital);
    if digital_pct > DIGITAL_CONCENTRATION_LIMIT_PCT {
        return Alert::DigitalConcentration { pct: digital_pct };
    }

    let cash_pct = pct_of(AssetClass::Cash);
    if cash_pct < LOW_LIQUIDITY_LIMIT_PCT {
        return Alert::LowLiquidity { pct: cash_pct };
    }

    if let Some(largest) = largest {
        if largest.share_pct > POSITION_CONCENTRATION_LIMIT_PCT {
            return Alert::PositionConcentration {
                symbol: largest.symbol.clone(),
                share_pct: largest.share_pct,
            };
        }
    }

    Alert::Balanced
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn holding(symbol: &str, quantity: f64, avg: f64, current: f64) -> Holding {
        Holding::normalized(symbol, quantity, avg, current, None)
    }

    fn cash(balance: f64) -> CashAccount {
        CashAccount {
            name: "checking".to_string(),
            balance,
        }
    }

    #[test]
    fn holding_metrics_products() {
        let m = HoldingMetrics::new(10.0, 150.0, 180.0);
        assert_eq!(m.invested, 1_500.0);
        assert_eq!(m.market_value, 1_800.0);
        assert_eq!(m.pnl, 300.0);
        assert!((m.pnl_pct - 20.0).abs() < EPS);
    }

    #[test]
    fn zero_invested_reports_zero_pct() {
        let m = HoldingMetrics::new(50.0, 0.0, 2.0);
        assert_eq!(m.invested, 0.0);
        assert_eq!(m.pnl, 100.0);
        assert_eq!(m.pnl_pct, 0.0);
    }

    #[test]
    fn net_worth_sums_all_classes() {
        let portfolio = Portfolio {
            cash_accounts: vec![cash(1_000.0), cash(500.0)],
            digital_holdings: vec![holding("BTC", 0.1, 20_000.0, 60_000.0)],
            equity_positions: vec![EquityPosition {
                symbol: "AAPL".to_string(),
                market_value: 2_269.2,
                change_pct: 9.7,
            }],
            watchlist: Vec::new(),
        };

        let summary = summarize(&portfolio);
        assert!((summary.net_worth - (1_500.0 + 6_000.0 + 2_269.2)).abs() < EPS);

        let digital = summary
            .allocations
            .iter()
            .find(|a| a.class == AssetClass::Digital)
            .unwrap();
        assert!((digital.total - 6_000.0).abs() < EPS);
        assert!((digital.pct - 6_000.0 / summary.net_worth * 100.0).abs() < EPS);
    }

    #[test]
    fn empty_portfolio_reports_zero_everything() {
        let summary = summarize(&Portfolio::default());
        assert_eq!(summary.net_worth, 0.0);
        for allocation in &summary.allocations {
            assert_eq!(allocation.pct, 0.0);
        }
        assert!(summary.largest_position.is_none());
    }

    #[test]
    fn top_movers_ranked_by_absolute_change() {
        let portfolio = Portfolio {
            cash_accounts: vec![cash(10_000.0)],
            digital_holdings: vec![
                holding("BTC", 1.0, 20_000.0, 22_000.0), // +10%
                holding("SOL", 10.0, 100.0, 60.0),       // -40%
            ],
            equity_positions: vec![
                EquityPosition {
                    symbol: "TSLA".to_string(),
                    market_value: 1_062.0,
                    change_pct: -13.6,
                },
                EquityPosition {
                    symbol: "MSFT".to_string(),
                    market_value: 3_389.6,
                    change_pct: 36.6,
                },
            ],
            watchlist: Vec::new(),
        };

        let movers = summarize(&portfolio).top_movers;
        let symbols: Vec<&str> = movers.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["SOL", "MSFT", "TSLA"]);
    }

    #[test]
    fn watchlist_backs_the_movers_row_when_empty() {
        let portfolio = Portfolio {
            cash_accounts: vec![cash(5_000.0)],
            watchlist: vec![
                Mover {
                    symbol: "NVDA".to_string(),
                    change_pct: 2.1,
                },
                Mover {
                    symbol: "AMD".to_string(),
                    change_pct: -3.4,
                },
            ],
            ..Portfolio::default()
        };

        let movers = summarize(&portfolio).top_movers;
        let symbols: Vec<&str> = movers.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AMD", "NVDA"]);
    }

    #[test]
    fn largest_position_spans_both_classes() {
        let portfolio = Portfolio {
            cash_accounts: vec![cash(10_000.0)],
            digital_holdings: vec![holding("BTC", 0.05, 20_000.0, 60_000.0)], // 3000
            equity_positions: vec![EquityPosition {
                symbol: "MSFT".to_string(),
                market_value: 3_389.6,
                change_pct: 36.6,
            }],
            watchlist: Vec::new(),
        };

        let largest = summarize(&portfolio).largest_position.unwrap();
        assert_eq!(largest.symbol, "MSFT");
        assert!((largest.market_value - 3_389.6).abs() < EPS);
    }

    #[test]
    fn digital_concentration_wins_over_low_liquidity() {
        // Digital at 50%, cash at 5%: the first rule in the chain must fire,
        // even though liquidity is also breached.
        let portfolio = Portfolio {
            cash_accounts: vec![cash(500.0)],
            digital_holdings: vec![holding("BTC", 1.0, 4_000.0, 5_000.0)],
            equity_positions: vec![EquityPosition {
                symbol: "AAPL".to_string(),
                market_value: 4_500.0,
                change_pct: 1.0,
            }],
            watchlist: Vec::new(),
        };

        let summary = summarize(&portfolio);
        match summary.alert {
            Alert::DigitalConcentration { pct } => assert!((pct - 50.0).abs() < EPS),
            other => panic!("expected digital concentration alert, got {other:?}"),
        }
    }

    #[test]
    fn low_liquidity_fires_when_digital_is_within_limits() {
        let portfolio = Portfolio {
            cash_accounts: vec![cash(100.0)],
            digital_holdings: Vec::new(),
            equity_positions: vec![
                EquityPosition {
                    symbol: "AAPL".to_string(),
                    market_value: 500.0,
                    change_pct: 1.0,
                },
                EquityPosition {
                    symbol: "MSFT".to_string(),
                    market_value: 400.0,
                    change_pct: 1.0,
                },
            ],
            watchlist: Vec::new(),
        };

        let summary = summarize(&portfolio);
        assert!(matches!(summary.alert, Alert::LowLiquidity { .. }));
    }

    #[test]
    fn position_concentration_fires_third() {
        // Cash comfortably above the liquidity floor, digital at zero, but one
        // equity position holds ~57% of net worth.
        let portfolio = Portfolio {
            cash_accounts: vec![cash(3_000.0)],
            digital_holdings: Vec::new(),
            equity_positions: vec![EquityPosition {
                symbol: "NVDA".to_string(),
                market_value: 4_000.0,
                change_pct: 5.0,
            }],
            watchlist: Vec::new(),
        };

        let summary = summarize(&portfolio);
        match summary.alert {
            Alert::PositionConcentration { symbol, share_pct } => {
                assert_eq!(symbol, "NVDA");
                assert!(share_pct > POSITION_CONCENTRATION_LIMIT_PCT);
            }
            other => panic!("expected position concentration alert, got {other:?}"),
        }
    }

    #[test]
    fn balanced_when_no_rule_matches() {
        let portfolio = Portfolio {
            cash_accounts: vec![cash(4_000.0)],
            digital_holdings: vec![holding("BTC", 0.05, 20_000.0, 40_000.0)], // 2000
            equity_positions: vec![
                EquityPosition {
                    symbol: "AAPL".to_string(),
                    market_value: 2_000.0,
                    change_pct: 1.0,
                },
                EquityPosition {
                    symbol: "MSFT".to_string(),
                    market_value: 2_000.0,
                    change_pct: 1.0,
                },
            ],
            watchlist: Vec::new(),
        };

        let summary = summarize(&portfolio);
        assert_eq!(summary.alert, Alert::Balanced);
    }
}
