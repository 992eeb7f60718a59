use std::str::FromStr;

use rust_decimal::Decimal;

use super::error::ExportError;
use crate::api::Balance;

/// An asset picked for export and the pair its trades are listed under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAsset {
    pub asset: String,
    pub symbol: String,
    pub free: String,
    pub locked: String,
}

/// Pick the assets with a non-zero free balance, in exchange order.
///
/// The base currency is skipped before its quantity is looked at. A free
/// quantity that is not a decimal number fails the whole selection.
pub fn select_assets(
    balances: &[Balance],
    base_currency: &str,
) -> Result<Vec<SelectedAsset>, ExportError> {
    let mut selected = Vec::new();

    for balance in balances {
        if balance.asset == base_currency {
            continue;
        }

        if parse_quantity(&balance.asset, &balance.free)?.is_zero() {
            continue;
        }

        selected.push(SelectedAsset {
            asset: balance.asset.clone(),
            symbol: format!("{}{}", balance.asset, base_currency),
            free: balance.free.clone(),
            locked: balance.locked.clone(),
        });
    }

    log::debug!(
        "Selected {} of {} balances for export",
        selected.len(),
        balances.len()
    );
    Ok(selected)
}

fn parse_quantity(asset: &str, value: &str) -> Result<Decimal, ExportError> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| ExportError::InvalidQuantity {
            asset: asset.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(asset: &str, free: &str) -> Balance {
        Balance {
            asset: asset.to_string(),
            free: free.to_string(),
            locked: "0.00000000".to_string(),
        }
    }

    fn symbols(selected: &[SelectedAsset]) -> Vec<&str> {
        selected.iter().map(|a| a.symbol.as_str()).collect()
    }

    #[test]
    fn test_usd_btc_eth_scenario() {
        let balances = vec![
            balance("USD", "100"),
            balance("BTC", "0.5"),
            balance("ETH", "0"),
        ];

        let selected = select_assets(&balances, "USD").unwrap();

        assert_eq!(symbols(&selected), vec!["BTCUSD"]);
        assert_eq!(selected[0].asset, "BTC");
        assert_eq!(selected[0].free, "0.5");
    }

    #[test]
    fn test_every_zero_spelling_is_skipped() {
        let balances: Vec<Balance> = ["0", "0.0", "0.00000000", "-0"]
            .iter()
            .map(|free| balance("DOGE", free))
            .collect();

        assert!(select_assets(&balances, "USD").unwrap().is_empty());
    }

    #[test]
    fn test_base_currency_never_emitted() {
        let assets = ["USD", "BTC", "USD", "ETH", "SOL", "USD"];
        let frees = ["1", "2", "3", "0", "0.1", "9"];
        let balances: Vec<Balance> = assets
            .iter()
            .zip(frees.iter())
            .map(|(asset, free)| balance(asset, free))
            .collect();

        let selected = select_assets(&balances, "USD").unwrap();

        assert!(selected.iter().all(|a| a.asset != "USD"));
        assert!(selected.iter().all(|a| a.symbol != "USDUSD"));
        assert_eq!(symbols(&selected), vec!["BTCUSD", "SOLUSD"]);
    }

    #[test]
    fn test_base_currency_is_not_parsed() {
        let balances = vec![balance("USD", "not-a-number"), balance("BTC", "1")];

        let selected = select_assets(&balances, "USD").unwrap();
        assert_eq!(symbols(&selected), vec!["BTCUSD"]);
    }

    #[test]
    fn test_exchange_order_is_kept() {
        let balances = vec![
            balance("SOL", "3"),
            balance("ADA", "10"),
            balance("BTC", "0.00000001"),
        ];

        let selected = select_assets(&balances, "USD").unwrap();
        assert_eq!(symbols(&selected), vec!["SOLUSD", "ADAUSD", "BTCUSD"]);
    }

    #[test]
    fn test_other_base_currency() {
        let balances = vec![balance("USDT", "50"), balance("ETH", "1.25")];

        let selected = select_assets(&balances, "USDT").unwrap();
        assert_eq!(symbols(&selected), vec!["ETHUSDT"]);
    }

    #[test]
    fn test_unparseable_quantity_is_fatal() {
        let balances = vec![balance("BTC", "0.5"), balance("ETH", "1,5")];

        match select_assets(&balances, "USD") {
            Err(ExportError::InvalidQuantity { asset, value, .. }) => {
                assert_eq!(asset, "ETH");
                assert_eq!(value, "1,5");
            }
            other => panic!("expected InvalidQuantity, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_quantity_is_fatal() {
        let balances = vec![balance("BTC", "")];
        assert!(matches!(
            select_assets(&balances, "USD"),
            Err(ExportError::InvalidQuantity { .. })
        ));
    }
}
