//! Recognizes a scheduled batch-order (TWAP) pattern: a delegate-call to a
//! conditional-order handler, preceded in the same batch by an ERC-20
//! approval. Decodes the static-ABI-encoded order payload and formats the
//! amounts using a token-decimals lookup.

use super::{Interpretation, Severity};
use crate::calldata::{CallOperation, CallStep};
use crate::primitives::{Address, U256};
use std::collections::HashMap;

const APPROVE_METHOD: &str = "approve";
/// Five static 32-byte words: sellToken, buyToken, partSellAmount (part
/// count as a divisor of total), partInterval, minPartLimit. Matches the
/// order payload a scheduled batch-order handler expects after its 4-byte
/// selector.
const ORDER_PAYLOAD_WORDS: usize = 5;

/// Thin external-collaborator seam: a real deployment backs this with a
/// token registry service. The built-in default only recognizes a handful
/// of well-known mainnet stablecoins and otherwise reports raw base units.
pub trait TokenDecimals {
    fn decimals_for(&self, token: Address) -> Option<u8>;
}

pub struct KnownTokenDecimals(HashMap<Address, u8>);

impl Default for KnownTokenDecimals {
    fn default() -> Self {
        let mut map = HashMap::new();
        // USDC
        if let Ok(addr) = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".parse() {
            map.insert(addr, 6);
        }
        // USDT
        if let Ok(addr) = "0xdAC17F958D2ee523a2206206994597C13D831ec7".parse() {
            map.insert(addr, 6);
        }
        // DAI
        if let Ok(addr) = "0x6B175474E89094C44Da98b954EedeAC495271d0F".parse() {
            map.insert(addr, 18);
        }
        // WETH
        if let Ok(addr) = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".parse() {
            map.insert(addr, 18);
        }
        Self(map)
    }
}

impl TokenDecimals for KnownTokenDecimals {
    fn decimals_for(&self, token: Address) -> Option<u8> {
        self.0.get(&token).copied()
    }
}

pub fn interpret(
    step: &CallStep,
    all_steps: &[CallStep],
    _safe_address: Address,
) -> Option<Interpretation> {
    if step.operation != CallOperation::DelegateCall {
        return None;
    }

    let preceded_by_approval = all_steps
        .iter()
        .any(|s| s.index < step.index && s.operation == CallOperation::Call && s.method.as_deref() == Some(APPROVE_METHOD));
    if !preceded_by_approval {
        return None;
    }

    let order = decode_order_payload(&step.raw_data)?;
    let decimals = KnownTokenDecimals::default();
    let sell_decimals = decimals.decimals_for(order.sell_token);
    let buy_decimals = decimals.decimals_for(order.buy_token);

    let summary = format!(
        "Schedules a TWAP order selling {} for {} over {} part(s), one every {}s",
        format_amount(order.sell_token, sell_decimals),
        format_amount(order.buy_token, buy_decimals),
        order.part_count,
        order.part_interval_seconds,
    );

    Some(Interpretation {
        id: "twap-order".to_string(),
        protocol: "Scheduled batch order (TWAP)".to_string(),
        action: "create_scheduled_order".to_string(),
        severity: Severity::Elevated,
        summary,
        details: serde_json::json!({
            "sellToken": order.sell_token.to_string(),
            "buyToken": order.buy_token.to_string(),
            "partCount": order.part_count.to_string(),
            "partIntervalSeconds": order.part_interval_seconds.to_string(),
            "minPartBuyAmount": order.min_part_buy_amount.to_string(),
            "sellTokenDecimals": sell_decimals,
            "buyTokenDecimals": buy_decimals,
        }),
    })
}

fn format_amount(token: Address, decimals: Option<u8>) -> String {
    match decimals {
        Some(d) => format!("{token} ({d} decimals)"),
        None => format!("{token} (decimals unknown)"),
    }
}

struct OrderPayload {
    sell_token: Address,
    buy_token: Address,
    part_count: U256,
    part_interval_seconds: U256,
    min_part_buy_amount: U256,
}

/// Decodes a static ABI-encoded `(address,address,uint256,uint256,uint256)`
/// tuple following a 4-byte selector. Returns `None` if there isn't enough
/// data, rather than panicking on a slice-out-of-bounds.
fn decode_order_payload(raw_data: &[u8]) -> Option<OrderPayload> {
    let body = raw_data.get(4..)?;
    if body.len() < 32 * ORDER_PAYLOAD_WORDS {
        return None;
    }
    let word = |i: usize| &body[i * 32..(i + 1) * 32];
    Some(OrderPayload {
        sell_token: Address::from_slice(&word(0)[12..32]),
        buy_token: Address::from_slice(&word(1)[12..32]),
        part_count: U256::from_be_slice(word(2)),
        part_interval_seconds: U256::from_be_slice(word(3)),
        min_part_buy_amount: U256::from_be_slice(word(4)),
    })
}
