// File: src/view_model.rs
// Read-only projections of explorer state, shared by the TUI and the web session

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data_models::TransactionView;
use crate::navigator::{BlockPanel, ChainPanel, Explorer, Resolution};

/// Detail status as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailStatus {
    Idle,
    Loading,
    Loaded,
    Unavailable,
}

impl From<Resolution> for DetailStatus {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Idle => DetailStatus::Idle,
            Resolution::Loading => DetailStatus::Loading,
            Resolution::Loaded => DetailStatus::Loaded,
            Resolution::Unavailable => DetailStatus::Unavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerView {
    pub loaded: bool,
    pub chain: Option<ChainSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSection {
    pub length: u64,
    pub rows: Vec<ChainRow>,
    pub block_status: DetailStatus,
    pub block: Option<BlockSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRow {
    pub hash: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSection {
    pub block_hash: String,
    pub transaction_count: u64,
    pub index: u64,
    pub previous_hash: String,
    pub timestamp: String,
    pub entries: Vec<TransactionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub hash: String,
    pub expanded: bool,
    pub status: DetailStatus,
    pub transaction: Option<TransactionCard>,
}

/// The transaction panel: the four fields a reader cares about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCard {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub timestamp: String,
}

impl TransactionCard {
    /// Labelled fields in display order
    pub fn fields(&self) -> [(&'static str, String); 4] {
        [
            ("Sender", self.sender.clone()),
            ("Recipient", self.recipient.clone()),
            ("Amount", self.amount.to_string()),
            ("Date", self.timestamp.clone()),
        ]
    }
}

pub fn transaction_card(transaction: Option<&TransactionView>) -> Option<TransactionCard> {
    let details = &transaction?.signed.details;
    Some(TransactionCard {
        sender: details.sender.clone(),
        recipient: details.recipient.clone(),
        amount: details.amount,
        timestamp: format_timestamp(&details.timestamp),
    })
}

pub fn explorer_view(explorer: &Explorer) -> ExplorerView {
    let chain = explorer.chain_panel().map(chain_section);
    ExplorerView {
        loaded: chain.is_some(),
        chain,
    }
}

pub fn chain_section(panel: &ChainPanel) -> ChainSection {
    let selected = panel.selected_hash();
    let rows = panel
        .chain()
        .hashes
        .iter()
        .map(|hash| ChainRow {
            hash: hash.clone(),
            active: selected == Some(hash.as_str()),
        })
        .collect();

    ChainSection {
        length: panel.chain().length,
        rows,
        block_status: panel.resolution().into(),
        block: panel.block_panel().map(block_section),
    }
}

pub fn block_section(panel: &BlockPanel) -> BlockSection {
    let block = panel.block();
    let expanded = panel.expanded_hash();

    let entries = block
        .transaction_hashes
        .iter()
        .map(|hash| {
            let is_open = expanded == Some(hash.as_str());
            TransactionEntry {
                hash: hash.clone(),
                expanded: is_open,
                status: if is_open { panel.resolution().into() } else { DetailStatus::Idle },
                transaction: if is_open { transaction_card(panel.transaction()) } else { None },
            }
        })
        .collect();

    BlockSection {
        block_hash: block.block_hash.clone(),
        transaction_count: block.transaction_count,
        index: block.index,
        previous_hash: block.header.previous_hash.clone(),
        timestamp: format_timestamp(&block.header.timestamp),
        entries,
    }
}

/// Reformat service timestamps to UTC, or pass them through untouched
pub fn format_timestamp(raw: &str) -> String {
    let parsed = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        });

    match parsed {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => raw.to_string(),
    }
}

/// Shorten a hash for narrow columns
pub fn truncate_hash(hash: &str, max_len: usize) -> String {
    if hash.chars().count() > max_len {
        let head: String = hash.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        hash.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::{BlockHeader, BlockView, ChainView, SignedTransaction, TransactionDetails};
    use crate::navigator::{FetchOutcome, FetchRequest};

    fn explorer_with(hashes: &[&str]) -> Explorer {
        let mut explorer = Explorer::new();
        explorer.mount();
        explorer.apply(FetchOutcome::Chain(ChainView {
            hashes: hashes.iter().map(|h| h.to_string()).collect(),
            length: 99,
        }));
        explorer
    }

    fn block(hash: &str, txs: &[&str]) -> BlockView {
        BlockView {
            index: 2,
            transaction_hashes: txs.iter().map(|t| t.to_string()).collect(),
            transaction_count: txs.len() as u64,
            header: BlockHeader {
                previous_hash: "h1".into(),
                timestamp: "2021-03-01 10:00:00.000000+0000".into(),
                ..Default::default()
            },
            block_hash: hash.to_string(),
            size: 10,
        }
    }

    #[test]
    fn unloaded_explorer_renders_no_chain() {
        let view = explorer_view(&Explorer::new());
        assert!(!view.loaded);
        assert!(view.chain.is_none());
    }

    #[test]
    fn one_row_per_hash_in_order() {
        let explorer = explorer_with(&["c", "a", "b"]);
        let section = explorer_view(&explorer).chain.unwrap();
        let hashes: Vec<_> = section.rows.iter().map(|r| r.hash.as_str()).collect();
        assert_eq!(hashes, vec!["c", "a", "b"]);
        assert_eq!(section.length, 99);
        assert!(section.rows.iter().all(|r| !r.active));
    }

    #[test]
    fn empty_chain_renders_empty_table() {
        let explorer = explorer_with(&[]);
        let section = explorer_view(&explorer).chain.unwrap();
        assert!(section.rows.is_empty());
        assert!(section.block.is_none());
    }

    #[test]
    fn failed_block_fetch_renders_no_block_rows() {
        let mut explorer = explorer_with(&["h1", "h2"]);
        let Some(FetchRequest::Block(ticket)) = explorer.select("h2") else {
            panic!("expected block fetch");
        };
        explorer.apply(FetchOutcome::Block(ticket, None));

        let section = explorer_view(&explorer).chain.unwrap();
        assert_eq!(section.rows.len(), 2);
        assert!(section.rows[1].active);
        assert!(section.block.is_none());
        assert_eq!(section.block_status, DetailStatus::Unavailable);
    }

    #[test]
    fn scenario_select_block_then_expand_transaction() {
        let mut explorer = explorer_with(&["h1", "h2"]);
        let Some(FetchRequest::Block(ticket)) = explorer.select("h2") else {
            panic!("expected block fetch");
        };
        explorer.apply(FetchOutcome::Block(ticket, Some(block("h2", &["tx1"]))));

        let Some(FetchRequest::Transaction { block, transaction }) = explorer.toggle_transaction("tx1") else {
            panic!("expected transaction fetch");
        };
        let view = explorer_view(&explorer);
        let entry = &view.chain.as_ref().unwrap().block.as_ref().unwrap().entries[0];
        assert!(entry.expanded);
        assert_eq!(entry.status, DetailStatus::Loading);
        assert!(entry.transaction.is_none());

        explorer.apply(FetchOutcome::Transaction {
            block,
            transaction,
            result: Some(TransactionView {
                transaction_hash: "tx1".into(),
                transaction_id: "id".into(),
                signed: SignedTransaction {
                    details: TransactionDetails {
                        sender: "A".into(),
                        recipient: "B".into(),
                        amount: 5.0,
                        nonce: 0,
                        timestamp: "2021-03-01T10:00:00Z".into(),
                        public_key: "pk".into(),
                    },
                    signature: "sig".into(),
                },
            }),
        });

        let section = explorer_view(&explorer).chain.unwrap().block.unwrap();
        assert_eq!(section.block_hash, "h2");
        assert_eq!(section.transaction_count, 1);
        let card = section.entries[0].transaction.as_ref().unwrap();
        assert_eq!(card.sender, "A");
        assert_eq!(card.recipient, "B");
        assert_eq!(card.amount, 5.0);
        assert_eq!(card.timestamp, "2021-03-01 10:00:00 UTC");
    }

    #[test]
    fn transaction_panel_renders_nothing_without_input() {
        assert!(transaction_card(None).is_none());
    }

    #[test]
    fn amounts_print_without_trailing_zero() {
        let card = |amount| TransactionCard {
            sender: "A".into(),
            recipient: "B".into(),
            amount,
            timestamp: String::new(),
        };
        assert_eq!(card(5.0).fields()[2].1, "5");
        assert_eq!(card(0.5).fields()[2].1, "0.5");
    }

    #[test]
    fn timestamps_are_normalised_when_parseable() {
        assert_eq!(format_timestamp("2021-03-01 10:00:00.123456+0100"), "2021-03-01 09:00:00 UTC");
        assert_eq!(format_timestamp("2021-03-01 10:00:00"), "2021-03-01 10:00:00 UTC");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn truncates_long_hashes() {
        assert_eq!(truncate_hash("abcdef", 10), "abcdef");
        assert_eq!(truncate_hash("abcdefghijkl", 8), "abcde...");
    }
}
