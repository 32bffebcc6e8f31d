//! An in-memory chain state.
//!
//! [`MemoryState`] keeps every view in plain collections with public fields,
//! so tests and tools can set up exactly the state a check needs.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    ops::Range,
    sync::Arc,
};

use ela_chain::{
    transaction::{payload::NextTurnDposInfo, OutPoint, Output, Transaction},
    Amount, Hash, ProgramHash,
};

use crate::{
    ArbitratorSnapshot, ArbitratorState, Candidate, CandidateStatus, ChainStore, CommitteeState,
    ConsensusAlgorithm, CrMember, MemberStatus, Producer, ProducerIdentity, ProducerState,
    ProducerStatus, ProposalState, ProposalStatus, References, StateError, WithdrawalInfo,
};


/// A chain state held entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryState {
    /// Confirmed transactions and their heights.
    pub transactions: HashMap<Hash, (Arc<Transaction>, u32)>,
    /// Outputs spent by confirmed or pending transactions.
    pub spent: HashSet<OutPoint>,
    /// Side-chain transactions already withdrawn.
    pub withdrawn_side_chain_txs: HashSet<Hash>,
    /// Side-chain deposits already returned.
    pub returned_deposits: HashSet<Hash>,
    /// The timestamp of the best block.
    pub best_block_timestamp: u32,

    /// Arbitrator snapshots by height.
    pub snapshots: BTreeMap<u32, Vec<ArbitratorSnapshot>>,
    /// The current arbitrators, CRC arbitrators included.
    pub arbitrators: Vec<Vec<u8>>,
    /// The current CRC arbitrators.
    pub crc_arbiters: Vec<Vec<u8>>,
    /// The arbitrator signing side-chain proofs of work.
    pub on_duty_cross_chain_arbitrator: Option<Vec<u8>>,
    /// The arbitrators of the next round.
    pub next_turn_dpos_info: Option<NextTurnDposInfo>,

    /// Candidates by CID.
    pub candidates: HashMap<ProgramHash, Candidate>,
    /// Council members by DID.
    pub members: HashMap<ProgramHash, CrMember>,
    /// Proposals by hash.
    pub proposals: HashMap<Hash, ProposalState>,
    /// Withdrawable deposits by candidate or member CID.
    pub cr_deposits: HashMap<ProgramHash, Amount>,
    /// Committee funds of the current term.
    pub current_stage_amount: Amount,
    /// Funds promised to proposals this term.
    pub committee_used_amount: Amount,
    /// The appropriation due, if any.
    pub appropriation_amount: Option<Amount>,
    /// Withdrawable budget by proposal hash.
    pub withdrawable: HashMap<Hash, Amount>,
    /// Unpaid withdrawals by withdrawal transaction hash.
    pub real_withdrawals: HashMap<Hash, WithdrawalInfo>,
    /// Heights CR registration and CR votes are open at.
    pub voting_period: Range<u32>,
    /// Heights no proposals are accepted at.
    pub proposals_closed: Range<u32>,
    /// Reserved custom IDs.
    pub reserved_custom_ids: Vec<String>,
    /// Custom IDs already received.
    pub received_custom_ids: Vec<String>,
    /// The secretary general's public key.
    pub secretary_general: Vec<u8>,
    /// Registered side chains as (name, magic number, genesis hash).
    pub side_chains: Vec<(String, u32, Hash)>,

    /// The current consensus mode.
    pub consensus: ConsensusAlgorithm,
    /// Producers by owner public key.
    pub producers: HashMap<Vec<u8>, Producer>,
    /// DPoS v2 voting rights by stake address.
    pub vote_rights: HashMap<ProgramHash, Amount>,
}

impl MemoryState {
    /// Returns an empty state.
    pub fn new() -> MemoryState {
        MemoryState::default()
    }

    /// Records `tx` as confirmed at `height`, spending its inputs.
    pub fn add_transaction(&mut self, tx: Transaction, height: u32) -> Arc<Transaction> {
        let hash = tx.hash();
        tracing::trace!(?hash, height, tx_type = tx.tx_type.name(), "adding transaction");

        if !tx.is_coinbase() {
            self.spent
                .extend(tx.inputs.iter().map(|input| input.previous));
        }

        let tx = Arc::new(tx);
        self.transactions.insert(hash, (tx.clone(), height));
        tx
    }

    /// Records a producer, keyed by its owner public key.
    pub fn add_producer(&mut self, producer: Producer) {
        self.producers
            .insert(producer.info.owner_public_key.clone(), producer);
    }

    /// Records a CR candidate, keyed by its CID.
    pub fn add_candidate(&mut self, candidate: Candidate) {
        self.candidates.insert(candidate.info.cid, candidate);
    }

    /// Records a council member, keyed by its DID.
    pub fn add_member(&mut self, member: CrMember) {
        self.members.insert(member.info.did, member);
    }

    /// Records a proposal, keyed by its hash.
    pub fn add_proposal(&mut self, proposal: ProposalState) -> Hash {
        let hash = proposal.proposal.hash(proposal.payload_version);
        self.proposals.insert(hash, proposal);
        hash
    }

    /// Moves the proposal with `hash` to `status`.
    ///
    /// Returns `false` if there is no such proposal.
    pub fn set_proposal_status(&mut self, hash: &Hash, status: ProposalStatus) -> bool {
        match self.proposals.get_mut(hash) {
            Some(proposal) => {
                proposal.status = status;
                true
            }
            None => false,
        }
    }

    fn output(&self, outpoint: &OutPoint) -> Result<Output, StateError> {
        let (tx, _) = self
            .transactions
            .get(&outpoint.tx_id)
            .ok_or_else(|| StateError::missing(*outpoint))?;

        tx.outputs
            .get(usize::from(outpoint.index))
            .cloned()
            .ok_or(StateError::OutputIndex {
                tx_id: outpoint.tx_id,
                index: outpoint.index,
            })
    }

    fn producers_with(&self, status: &[ProducerStatus]) -> impl Iterator<Item = &Producer> {
        let status = status.to_vec();
        self.producers
            .values()
            .filter(move |producer| status.contains(&producer.status))
    }
}

impl ChainStore for MemoryState {
    fn tx_references(&self, tx: &Transaction) -> Result<References, StateError> {
        tx.inputs
            .iter()
            .map(|input| {
                self.output(&input.previous)
                    .map(|output| (*input, output))
            })
            .collect()
    }

    fn transaction(&self, hash: &Hash) -> Option<(Arc<Transaction>, u32)> {
        self.transactions.get(hash).cloned()
    }

    fn is_tx_hash_duplicate(&self, hash: &Hash) -> bool {
        self.transactions.contains_key(hash)
    }

    fn is_double_spend(&self, tx: &Transaction) -> bool {
        tx.inputs
            .iter()
            .any(|input| self.spent.contains(&input.previous))
    }

    fn is_side_chain_tx_hash_duplicate(&self, hash: &Hash) -> bool {
        self.withdrawn_side_chain_txs.contains(hash)
    }

    fn is_side_chain_return_deposit_exist(&self, hash: &Hash) -> bool {
        self.returned_deposits.contains(hash)
    }

    fn best_block_timestamp(&self) -> u32 {
        self.best_block_timestamp
    }
}

impl ArbitratorState for MemoryState {
    fn snapshot(&self, height: u32) -> Vec<ArbitratorSnapshot> {
        self.snapshots.get(&height).cloned().unwrap_or_default()
    }

    fn is_arbitrator(&self, public_key: &[u8]) -> bool {
        self.arbitrators.iter().any(|key| key.as_slice() == public_key)
    }

    fn is_crc_arbitrator(&self, public_key: &[u8]) -> bool {
        self.crc_arbiters.iter().any(|key| key.as_slice() == public_key)
    }

    fn crc_arbiters(&self) -> Vec<Vec<u8>> {
        self.crc_arbiters.clone()
    }

    fn arbitrators(&self) -> Vec<Vec<u8>> {
        self.arbitrators.clone()
    }

    fn on_duty_cross_chain_arbitrator(&self) -> Option<Vec<u8>> {
        self.on_duty_cross_chain_arbitrator.clone()
    }

    fn next_turn_dpos_info(&self) -> Option<NextTurnDposInfo> {
        self.next_turn_dpos_info.clone()
    }

    fn is_active_producer(&self, public_key: &[u8]) -> bool {
        self.producers_with(&[ProducerStatus::Active])
            .any(|producer| producer.info.node_public_key == public_key)
    }

    fn is_disabled_producer(&self, public_key: &[u8]) -> bool {
        self.producers_with(&[ProducerStatus::Inactive, ProducerStatus::Illegal])
            .any(|producer| producer.info.node_public_key == public_key)
    }
}

impl CommitteeState for MemoryState {
    fn candidate(&self, cid: &ProgramHash) -> Option<Candidate> {
        self.candidates.get(cid).cloned()
    }

    fn member(&self, did: &ProgramHash) -> Option<CrMember> {
        self.members.get(did).cloned()
    }

    fn member_by_cid(&self, cid: &ProgramHash) -> Option<CrMember> {
        self.members
            .values()
            .find(|member| member.info.cid == *cid)
            .cloned()
    }

    fn proposal(&self, hash: &Hash) -> Option<ProposalState> {
        self.proposals.get(hash).cloned()
    }

    fn proposal_count(&self, did: &ProgramHash) -> usize {
        self.proposals
            .values()
            .filter(|state| state.proposal.cr_council_member_did == *did)
            .filter(|state| {
                !matches!(
                    state.status,
                    ProposalStatus::Finished
                        | ProposalStatus::CRCanceled
                        | ProposalStatus::VoterCanceled
                        | ProposalStatus::Aborted
                        | ProposalStatus::Terminated
                )
            })
            .count()
    }

    fn available_deposit_amount(&self, cid: &ProgramHash) -> Option<Amount> {
        self.cr_deposits.get(cid).copied()
    }

    fn is_cr_deposit_hash(&self, deposit_hash: &ProgramHash) -> bool {
        self.candidates
            .values()
            .any(|candidate| candidate.deposit_hash == *deposit_hash)
            || self
                .members
                .values()
                .any(|member| member.deposit_hash == *deposit_hash)
    }

    fn is_cr_nickname_used(&self, nickname: &str) -> bool {
        self.candidates
            .values()
            .filter(|candidate| candidate.status != CandidateStatus::Returned)
            .any(|candidate| candidate.info.nickname == nickname)
            || self
                .members
                .values()
                .any(|member| member.info.nickname == nickname)
    }

    fn current_stage_amount(&self) -> Amount {
        self.current_stage_amount
    }

    fn committee_used_amount(&self) -> Amount {
        self.committee_used_amount
    }

    fn appropriation_amount(&self) -> Option<Amount> {
        self.appropriation_amount
    }

    fn available_withdraw_amount(&self, hash: &Hash) -> Amount {
        self.withdrawable.get(hash).copied().unwrap_or(Amount::ZERO)
    }

    fn real_withdrawal(&self, hash: &Hash) -> Option<WithdrawalInfo> {
        self.real_withdrawals.get(hash).cloned()
    }

    fn is_in_voting_period(&self, height: u32) -> bool {
        self.voting_period.contains(&height)
    }

    fn is_proposal_allowed(&self, height: u32) -> bool {
        !self.proposals_closed.contains(&height)
    }

    fn reserved_custom_ids(&self) -> Vec<String> {
        self.reserved_custom_ids.clone()
    }

    fn received_custom_ids(&self) -> Vec<String> {
        self.received_custom_ids.clone()
    }

    fn secretary_general(&self) -> Vec<u8> {
        self.secretary_general.clone()
    }

    fn is_side_chain_name_used(&self, name: &str) -> bool {
        self.side_chains.iter().any(|(used, _, _)| used == name)
    }

    fn is_side_chain_magic_used(&self, magic_number: u32) -> bool {
        self.side_chains
            .iter()
            .any(|(_, magic, _)| *magic == magic_number)
    }

    fn is_side_chain_genesis_used(&self, genesis_hash: &Hash) -> bool {
        self.side_chains
            .iter()
            .any(|(_, _, genesis)| genesis == genesis_hash)
    }

    fn active_candidate_cids(&self) -> Vec<ProgramHash> {
        self.candidates
            .values()
            .filter(|candidate| candidate.status == CandidateStatus::Active)
            .map(|candidate| candidate.info.cid)
            .collect()
    }

    fn has_unclaimed_members(&self) -> bool {
        self.members
            .values()
            .filter(|member| member.status == MemberStatus::Elected)
            .any(|member| member.dpos_public_key.is_empty())
    }
}

impl ProducerState for MemoryState {
    fn consensus_algorithm(&self) -> ConsensusAlgorithm {
        self.consensus
    }

    fn producer_by_owner(&self, owner_public_key: &[u8]) -> Option<Producer> {
        self.producers.get(owner_public_key).cloned()
    }

    fn producer_by_node(&self, node_public_key: &[u8]) -> Option<Producer> {
        self.producers
            .values()
            .find(|producer| producer.info.node_public_key == node_public_key)
            .cloned()
    }

    fn producer_by_deposit_hash(&self, deposit_hash: &ProgramHash) -> Option<Producer> {
        self.producers
            .values()
            .find(|producer| producer.deposit_hash == *deposit_hash)
            .cloned()
    }

    fn is_producer_nickname_used(&self, nickname: &str) -> bool {
        self.producers
            .values()
            .filter(|producer| producer.status != ProducerStatus::Returned)
            .any(|producer| producer.info.nickname == nickname)
    }

    fn active_producer_keys(&self) -> Vec<Vec<u8>> {
        self.producers_with(&[ProducerStatus::Pending, ProducerStatus::Active])
            .map(|producer| producer.info.owner_public_key.clone())
            .collect()
    }

    fn dpos_v2_candidates(&self) -> Vec<Vec<u8>> {
        self.producers_with(&[ProducerStatus::Pending, ProducerStatus::Active])
            .filter(|producer| producer.identity != ProducerIdentity::DposV1)
            .map(|producer| producer.info.owner_public_key.clone())
            .collect()
    }

    fn vote_rights(&self, stake_address: &ProgramHash) -> Amount {
        self.vote_rights
            .get(stake_address)
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn active_producer_count(&self) -> usize {
        self.producers_with(&[ProducerStatus::Active]).count()
    }
}
