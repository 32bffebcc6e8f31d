//! The CR committee: candidates, council members and proposals.

use ela_chain::{
    transaction::payload::{BudgetType, CrInfo, CrcProposal},
    Amount, Hash, ProgramHash,
};

/// The lifecycle of a CR candidate.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum CandidateStatus {
    /// Registered, waiting for confirmations.
    #[default]
    Pending,
    /// Can receive votes.
    Active,
    /// Unregistered by its owner.
    Canceled,
    /// Its deposit was returned.
    Returned,
}

/// A CR candidate.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Candidate {
    /// The registration payload, as last updated.
    pub info: CrInfo,
    /// The candidate's status.
    pub status: CandidateStatus,
    /// The deposit address.
    pub deposit_hash: ProgramHash,
    /// The height the candidate was cancelled at.
    pub cancel_height: u32,
}

/// The lifecycle of an elected council member.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum MemberStatus {
    /// In office.
    #[default]
    Elected,
    /// Removed by an impeachment vote.
    Impeached,
    /// Its deposit was returned.
    Returned,
    /// The term ended.
    Terminated,
    /// The member's DPoS node missed too many rounds.
    Inactive,
    /// The member's DPoS node misbehaved.
    Illegal,
}

/// A council member.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CrMember {
    /// The member's registration payload.
    pub info: CrInfo,
    /// The member's status.
    pub status: MemberStatus,
    /// The DPoS node claimed by the member, if any.
    pub dpos_public_key: Vec<u8>,
    /// The deposit address.
    pub deposit_hash: ProgramHash,
}

/// The lifecycle of a CR proposal.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ProposalStatus {
    /// Waiting for council reviews.
    #[default]
    Registered,
    /// Approved by the council, waiting out the voter veto period.
    CRAgreed,
    /// Not vetoed by voters; budgets can be paid.
    VoterAgreed,
    /// Announced, waiting to take effect.
    Notification,
    /// Every budget was paid.
    Finished,
    /// Rejected by the council.
    CRCanceled,
    /// Vetoed by voters.
    VoterCanceled,
    /// Not reviewed in time.
    Aborted,
    /// Terminated by the secretary general.
    Terminated,
}

/// A proposal and its progress.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProposalState {
    /// The proposal as registered.
    pub proposal: CrcProposal,
    /// The payload version the proposal was registered with.
    pub payload_version: u8,
    /// The proposal's status.
    pub status: ProposalStatus,
    /// The current owner key, which changes with owner-change proposals.
    pub owner_key: Vec<u8>,
    /// The current budget recipient.
    pub recipient: ProgramHash,
    /// The next budget stage a tracking transaction may report.
    pub current_stage: u8,
    /// The number of tracking transactions so far.
    pub tracking_count: u8,
    /// The height the proposal was registered at.
    pub register_height: u32,
}

impl ProposalState {
    /// Returns the stage of the final payment budget.
    pub fn final_payment_stage(&self) -> Option<u8> {
        self.proposal
            .budgets
            .iter()
            .find(|budget| budget.budget_type == BudgetType::FinalPayment)
            .map(|budget| budget.stage)
    }
}

/// An approved proposal withdrawal waiting to be paid out.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WithdrawalInfo {
    /// The proposal paying out.
    pub proposal_hash: Hash,
    /// The recipient of the payment.
    pub recipient: ProgramHash,
    /// The withdrawn amount, before the payout fee.
    pub amount: Amount,
}

/// Read access to the CR committee.
pub trait CommitteeState {
    /// Returns the candidate with `cid`.
    fn candidate(&self, cid: &ProgramHash) -> Option<Candidate>;

    /// Returns the council member with `did`.
    fn member(&self, did: &ProgramHash) -> Option<CrMember>;

    /// Returns the council member with `cid`.
    fn member_by_cid(&self, cid: &ProgramHash) -> Option<CrMember>;

    /// Returns the proposal registered with `hash`.
    fn proposal(&self, hash: &Hash) -> Option<ProposalState>;

    /// Returns the number of unfinished proposals put forward by the member
    /// with `did`.
    fn proposal_count(&self, did: &ProgramHash) -> usize;

    /// Returns the deposit the candidate or member with `cid` can withdraw.
    fn available_deposit_amount(&self, cid: &ProgramHash) -> Option<Amount>;

    /// Returns `true` if a candidate or member deposit is held at
    /// `deposit_hash`.
    fn is_cr_deposit_hash(&self, deposit_hash: &ProgramHash) -> bool;

    /// Returns `true` if a candidate or member already uses `nickname`.
    fn is_cr_nickname_used(&self, nickname: &str) -> bool;

    /// Returns the committee funds of the current term.
    fn current_stage_amount(&self) -> Amount;

    /// Returns the funds already promised to proposals this term.
    fn committee_used_amount(&self) -> Amount;

    /// Returns the amount the next appropriation must move to the CR
    /// expenses address, or `None` if no appropriation is due.
    fn appropriation_amount(&self) -> Option<Amount>;

    /// Returns the amount the owner of proposal `hash` can withdraw now.
    fn available_withdraw_amount(&self, hash: &Hash) -> Amount;

    /// Returns the approved withdrawal made by transaction `hash`, if it
    /// hasn't been paid out yet.
    fn real_withdrawal(&self, hash: &Hash) -> Option<WithdrawalInfo>;

    /// Returns `true` if CR registration and CR votes are open at `height`.
    fn is_in_voting_period(&self, height: u32) -> bool;

    /// Returns `true` if proposals are accepted at `height`.
    fn is_proposal_allowed(&self, height: u32) -> bool;

    /// Returns the custom IDs reserved by an approved proposal.
    fn reserved_custom_ids(&self) -> Vec<String>;

    /// Returns the custom IDs already handed to a receiver.
    fn received_custom_ids(&self) -> Vec<String>;

    /// Returns the public key of the secretary general.
    fn secretary_general(&self) -> Vec<u8>;

    /// Returns `true` if a side chain is registered with `name`.
    fn is_side_chain_name_used(&self, name: &str) -> bool;

    /// Returns `true` if a side chain is registered with `magic_number`.
    fn is_side_chain_magic_used(&self, magic_number: u32) -> bool;

    /// Returns `true` if a side chain is registered with `genesis_hash`.
    fn is_side_chain_genesis_used(&self, genesis_hash: &Hash) -> bool;

    /// Returns the CIDs of candidates that can receive votes.
    fn active_candidate_cids(&self) -> Vec<ProgramHash>;

    /// Returns `true` if some elected member has not claimed a DPoS node.
    fn has_unclaimed_members(&self) -> bool;
}
