// File: src/cli_interface.rs
// One-shot CLI views of the chain, a block or a transaction

use anyhow::{Context, Result};
use crate::data_models::{AppConfig, BlockView, ChainView, TransactionView};
use crate::ledger_gateway::HttpGateway;
use crate::view_model::{format_timestamp, truncate_hash};

/// Execute CLI mode operations
pub async fn run_cli_mode(
    config: &AppConfig,
    block: Option<String>,
    transaction: Option<String>,
) -> Result<()> {
    let gateway = HttpGateway::new(config)?;

    match (block, transaction) {
        (Some(_), Some(_)) => anyhow::bail!("Cannot specify both --block and --transaction options"),
        (Some(hash), None) => show_block(&gateway, &hash).await,
        (None, Some(hash)) => show_transaction(&gateway, &hash).await,
        (None, None) => show_chain(&gateway).await,
    }
}

async fn show_chain(gateway: &HttpGateway) -> Result<()> {
    let chain = gateway
        .try_full_chain()
        .await
        .with_context(|| format!("Failed to load chain from {}", gateway.base_url()))?;

    if chain.hashes.is_empty() {
        println!("The chain is empty.");
        return Ok(());
    }

    for line in chain_table(&chain) {
        println!("{}", line);
    }
    Ok(())
}

async fn show_block(gateway: &HttpGateway, hash: &str) -> Result<()> {
    let block = gateway
        .try_block(hash)
        .await
        .with_context(|| format!("Failed to load block {}", hash))?;

    println!();
    println!("🔍 Block Detail View");
    for line in block_detail(&block) {
        println!("{}", line);
    }
    Ok(())
}

async fn show_transaction(gateway: &HttpGateway, hash: &str) -> Result<()> {
    let transaction = gateway
        .try_transaction(hash)
        .await
        .with_context(|| format!("Failed to load transaction {}", hash))?;

    println!();
    println!("⚡ Transaction Detail View");
    for line in transaction_detail(&transaction) {
        println!("{}", line);
    }
    Ok(())
}

/// Chain hashes as a numbered, boxed table
fn chain_table(chain: &ChainView) -> Vec<String> {
    let mut lines = Vec::with_capacity(chain.hashes.len() + 5);
    lines.push(format!("╭─{:─<6}─┬─{:─<64}─╮", "", ""));
    lines.push(format!("│ {:^6} │ {:^64} │", "#", "Block Hash"));
    lines.push(format!("├─{:─<6}─┼─{:─<64}─┤", "", ""));

    for (i, hash) in chain.hashes.iter().enumerate() {
        lines.push(format!("│ {:>6} │ {:<64} │", i, truncate_hash(hash, 64)));
    }

    lines.push(format!("╰─{:─<6}─┴─{:─<64}─╯", "", ""));

    let mut summary = format!("📊 {} blocks", chain.hashes.len());
    if !chain.is_consistent() {
        summary.push_str(&format!(" (service reports length {})", chain.length));
    }
    lines.push(summary);
    lines
}

fn block_detail(block: &BlockView) -> Vec<String> {
    let mut lines = vec![
        format!("╭─{:─<70}─╮", ""),
        format!("│ Index: {:>8}  Hash: {:<49} │", block.index, truncate_hash(&block.block_hash, 49)),
        format!(
            "│ Timestamp: {:<26} Nonce: {:>10} Size: {:>8} │",
            format_timestamp(&block.header.timestamp),
            block.header.nonce,
            block.size
        ),
        format!("│ Previous Hash: {:<55} │", truncate_hash(&block.header.previous_hash, 55)),
        format!("│ Merkle Root: {:<57} │", truncate_hash(&block.header.transaction_merkle_root, 57)),
        format!(
            "│ Version: {:>4}  Difficulty: {:>6}  Transactions: {:>6}{:<19} │",
            block.header.version, block.header.difficulty, block.transaction_count, ""
        ),
        format!("├─{:─<70}─┤", ""),
    ];

    if block.transaction_hashes.is_empty() {
        lines.push(format!("│ {:<70} │", "No transactions"));
    }
    for (i, hash) in block.transaction_hashes.iter().enumerate() {
        lines.push(format!("│ {:>3}: {:<65} │", i + 1, truncate_hash(hash, 65)));
    }

    lines.push(format!("╰─{:─<70}─╯", ""));
    lines
}

fn transaction_detail(transaction: &TransactionView) -> Vec<String> {
    let details = &transaction.signed.details;
    let rows = [
        ("Hash", transaction.transaction_hash.clone()),
        ("Id", transaction.transaction_id.clone()),
        ("Sender", details.sender.clone()),
        ("Recipient", details.recipient.clone()),
        ("Amount", details.amount.to_string()),
        ("Date", format_timestamp(&details.timestamp)),
        ("Nonce", details.nonce.to_string()),
        ("Public Key", details.public_key.clone()),
        ("Signature", transaction.signed.signature.clone()),
    ];

    let mut lines = vec![format!("╭─{:─<70}─╮", "")];
    for (label, value) in rows {
        lines.push(format!("│ {:<10}: {:<58} │", label, truncate_hash(&value, 58)));
    }
    lines.push(format!("╰─{:─<70}─╯", ""));
    lines
}
