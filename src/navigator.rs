// File: src/navigator.rs
// Drill-down navigation state: chain -> block -> transaction

use crate::data_models::{BlockView, ChainView, TransactionView};
use crate::ledger_gateway::LedgerGateway;

/// Identity of one outstanding fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub hash: String,
    pub epoch: u64,
}

/// Where a selection stands with respect to its data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Idle,
    Loading,
    Loaded,
    Unavailable,
}

/// Which hash is selected and what, if anything, it resolved to.
///
/// Every new selection bumps `epoch`. A completion is applied only while
/// its ticket still carries the current epoch and hash; anything else is a
/// late result for a selection the user has already moved away from.
#[derive(Debug)]
pub struct Selection<T> {
    selected: Option<String>,
    resolved: Option<T>,
    epoch: u64,
    settled: bool,
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self {
            selected: None,
            resolved: None,
            epoch: 0,
            settled: false,
        }
    }
}

impl<T> Selection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn resolved(&self) -> Option<&T> {
        self.resolved.as_ref()
    }

    pub fn resolved_mut(&mut self) -> Option<&mut T> {
        self.resolved.as_mut()
    }

    pub fn resolution(&self) -> Resolution {
        match (&self.selected, self.settled, &self.resolved) {
            (None, _, _) => Resolution::Idle,
            (Some(_), false, _) => Resolution::Loading,
            (Some(_), true, Some(_)) => Resolution::Loaded,
            (Some(_), true, None) => Resolution::Unavailable,
        }
    }

    /// Ticket for the current selection, if any
    pub fn ticket(&self) -> Option<Ticket> {
        self.selected.as_ref().map(|hash| Ticket {
            hash: hash.clone(),
            epoch: self.epoch,
        })
    }

    /// Select `hash` and return the ticket its fetch must present.
    pub fn begin(&mut self, hash: &str) -> Ticket {
        self.epoch += 1;
        self.selected = Some(hash.to_string());
        self.resolved = None;
        self.settled = false;
        Ticket {
            hash: hash.to_string(),
            epoch: self.epoch,
        }
    }

    /// Select `hash` with data already at hand
    pub fn show(&mut self, hash: &str, value: T) {
        self.begin(hash);
        self.resolved = Some(value);
        self.settled = true;
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.epoch == self.epoch && self.selected.as_deref() == Some(ticket.hash.as_str())
    }

    /// Apply a completion. Returns false when the ticket is stale.
    pub fn settle(&mut self, ticket: &Ticket, result: Option<T>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.resolved = result;
        self.settled = true;
        true
    }

    /// Drop the selection; in-flight completions become stale.
    pub fn clear(&mut self) {
        self.epoch += 1;
        self.selected = None;
        self.resolved = None;
        self.settled = false;
    }
}

/// A gateway call some panel is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Chain,
    Block(Ticket),
    /// `block` identifies the Block Panel that asked
    Transaction { block: Ticket, transaction: Ticket },
}

/// A settled gateway call, routed back to whoever asked
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Chain(ChainView),
    Block(Ticket, Option<BlockView>),
    Transaction {
        block: Ticket,
        transaction: Ticket,
        result: Option<TransactionView>,
    },
}

impl FetchRequest {
    /// Perform the gateway call this request stands for
    pub async fn resolve(self, gateway: &dyn LedgerGateway) -> FetchOutcome {
        match self {
            FetchRequest::Chain => FetchOutcome::Chain(gateway.fetch_full_chain().await),
            FetchRequest::Block(ticket) => {
                let block = gateway.fetch_block_by_hash(&ticket.hash).await;
                FetchOutcome::Block(ticket, block)
            }
            FetchRequest::Transaction { block, transaction } => {
                let result = gateway.fetch_transaction_by_hash(&transaction.hash).await;
                FetchOutcome::Transaction {
                    block,
                    transaction,
                    result,
                }
            }
        }
    }
}

/// One block's transaction list, with at most one entry expanded
#[derive(Debug)]
pub struct BlockPanel {
    block: BlockView,
    expanded: Selection<TransactionView>,
    last_resolved: Option<(String, TransactionView)>,
}

impl BlockPanel {
    pub fn new(block: BlockView) -> Self {
        Self {
            block,
            expanded: Selection::new(),
            last_resolved: None,
        }
    }

    pub fn block(&self) -> &BlockView {
        &self.block
    }

    pub fn expanded_hash(&self) -> Option<&str> {
        self.expanded.selected()
    }

    pub fn transaction(&self) -> Option<&TransactionView> {
        self.expanded.resolved()
    }

    pub fn resolution(&self) -> Resolution {
        self.expanded.resolution()
    }

    /// Expand `hash`, collapsing whatever was open. Returns the fetch to
    /// issue, or `None` when the last resolved transaction can be reused.
    pub fn expand(&mut self, hash: &str) -> Option<Ticket> {
        if !self.block.contains_transaction(hash) {
            log::debug!("Ignoring expand of {} outside block {}", hash, self.block.block_hash);
            return None;
        }

        match &self.last_resolved {
            Some((cached, tx)) if cached == hash => {
                let tx = tx.clone();
                self.expanded.show(hash, tx);
                None
            }
            _ => Some(self.expanded.begin(hash)),
        }
    }

    pub fn collapse(&mut self) {
        self.expanded.clear();
    }

    /// Expand `hash`, or collapse it if it is the expanded entry
    pub fn toggle(&mut self, hash: &str) -> Option<Ticket> {
        if self.expanded_hash() == Some(hash) {
            self.collapse();
            None
        } else {
            self.expand(hash)
        }
    }

    pub fn settle(&mut self, ticket: &Ticket, result: Option<TransactionView>) -> bool {
        let cached = result.clone();
        if !self.expanded.settle(ticket, result) {
            log::debug!("Discarding stale transaction result for {}", ticket.hash);
            return false;
        }
        if let Some(tx) = cached {
            self.last_resolved = Some((ticket.hash.clone(), tx));
        }
        true
    }
}

/// The chain table and the single selected block beneath it
#[derive(Debug)]
pub struct ChainPanel {
    chain: ChainView,
    selection: Selection<BlockPanel>,
}

impl ChainPanel {
    pub fn new(chain: ChainView) -> Self {
        Self {
            chain,
            selection: Selection::new(),
        }
    }

    pub fn chain(&self) -> &ChainView {
        &self.chain
    }

    pub fn selected_hash(&self) -> Option<&str> {
        self.selection.selected()
    }

    pub fn block_panel(&self) -> Option<&BlockPanel> {
        self.selection.resolved()
    }

    pub fn resolution(&self) -> Resolution {
        self.selection.resolution()
    }

    /// Select a block row. The row is active immediately; the block arrives
    /// through the returned request.
    pub fn select(&mut self, hash: &str) -> Option<FetchRequest> {
        if !self.chain.contains(hash) {
            log::debug!("Ignoring select of unknown block {}", hash);
            return None;
        }

        if self.selection.selected() == Some(hash)
            && matches!(self.selection.resolution(), Resolution::Loading | Resolution::Loaded)
        {
            return None;
        }

        Some(FetchRequest::Block(self.selection.begin(hash)))
    }

    pub fn expand_transaction(&mut self, hash: &str) -> Option<FetchRequest> {
        let block = self.selection.ticket()?;
        let transaction = self.selection.resolved_mut()?.expand(hash)?;
        Some(FetchRequest::Transaction { block, transaction })
    }

    pub fn toggle_transaction(&mut self, hash: &str) -> Option<FetchRequest> {
        let block = self.selection.ticket()?;
        let transaction = self.selection.resolved_mut()?.toggle(hash)?;
        Some(FetchRequest::Transaction { block, transaction })
    }

    pub fn collapse_transaction(&mut self) {
        if let Some(panel) = self.selection.resolved_mut() {
            panel.collapse();
        }
    }

    /// Route a completion to the panel that requested it. Returns true if
    /// it changed what is displayed.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        match outcome {
            FetchOutcome::Chain(_) => false,
            FetchOutcome::Block(ticket, block) => {
                let applied = self.selection.settle(&ticket, block.map(BlockPanel::new));
                if !applied {
                    log::debug!("Discarding stale block result for {}", ticket.hash);
                }
                applied
            }
            FetchOutcome::Transaction {
                block,
                transaction,
                result,
            } => {
                if !self.selection.is_current(&block) {
                    log::debug!("Discarding transaction {} for replaced block {}", transaction.hash, block.hash);
                    return false;
                }
                match self.selection.resolved_mut() {
                    Some(panel) => panel.settle(&transaction, result),
                    None => false,
                }
            }
        }
    }
}

/// Root of the explorer: fetches the chain once, then hosts the chain panel
#[derive(Debug, Default)]
pub struct Explorer {
    chain: Option<ChainPanel>,
    mounted: bool,
}

impl Explorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain fetch, yielded on the first call only
    pub fn mount(&mut self) -> Option<FetchRequest> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        Some(FetchRequest::Chain)
    }

    pub fn chain_panel(&self) -> Option<&ChainPanel> {
        self.chain.as_ref()
    }

    pub fn select(&mut self, hash: &str) -> Option<FetchRequest> {
        self.chain.as_mut()?.select(hash)
    }

    pub fn expand_transaction(&mut self, hash: &str) -> Option<FetchRequest> {
        self.chain.as_mut()?.expand_transaction(hash)
    }

    pub fn toggle_transaction(&mut self, hash: &str) -> Option<FetchRequest> {
        self.chain.as_mut()?.toggle_transaction(hash)
    }

    pub fn collapse_transaction(&mut self) {
        if let Some(chain) = self.chain.as_mut() {
            chain.collapse_transaction();
        }
    }

    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        match outcome {
            FetchOutcome::Chain(chain) => {
                if self.chain.is_some() {
                    return false;
                }
                self.chain = Some(ChainPanel::new(chain));
                true
            }
            other => match self.chain.as_mut() {
                Some(chain) => chain.apply(other),
                None => false,
            },
        }
    }
}
