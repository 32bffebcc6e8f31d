//! Transaction payloads.
//!
//! Every [`TxType`] has exactly one [`Payload`] variant. Payload layouts can
//! depend on the transaction's payload version, so the codec is driven by
//! the transaction rather than by `ElaSerialize`.

use std::io;

use super::TxType;
use crate::serialization::{
    max_items_for_size, ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError, WriteElaExt,
};

mod asset;
mod cr;
mod dpos;
mod producer;
mod proposal;
mod side_chain;
mod stake;

#[cfg(test)]
mod tests;

pub use asset::{Asset, CoinBase, Record, RegisterAsset};
pub use cr::{CrCouncilMemberClaimNode, CrInfo, UnregisterCr, CR_INFO_DID_VERSION};
pub use dpos::{
    BlockEvidence, DposConfirm, DposIllegalBlocks, DposIllegalProposals, DposIllegalVotes,
    DposProposal, DposProposalVote, InactiveArbitrators, NextTurnDposInfo, ProposalEvidence,
    RevertToDpos, RevertToPow, RevertType, SidechainIllegalData, UpdateVersion, VoteEvidence,
    NEXT_TURN_DPOS_INFO_V1,
};
pub use producer::{ActivateProducer, ProcessProducer, ProducerInfo, PRODUCER_INFO_DPOS_V2_VERSION};
pub use proposal::{
    Budget, BudgetType, CrcProposal, CrcProposalRealWithdraw, CrcProposalReview,
    CrcProposalTracking, CrcProposalWithdraw, ProposalTrackingType, ProposalType, SideChainInfo,
    VoteResult, CRC_PROPOSAL_DATA_VERSION, CRC_PROPOSAL_WITHDRAW_V1,
};
pub use side_chain::{
    CrossChainTransfer, SideChainPow, TransferCrossChainAsset, WithdrawFromSideChain,
    SIDE_CHAIN_PAYLOAD_V0, SIDE_CHAIN_PAYLOAD_V1,
};
pub use stake::{RenewalVotesContent, Voting, VotesContent, VotesWithLockTime, RENEWAL_VOTE_VERSION};

/// The type-specific data of a transaction.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum Payload {
    CoinBase(CoinBase),
    RegisterAsset(RegisterAsset),
    TransferAsset,
    Record(Record),
    SideChainPow(SideChainPow),
    WithdrawFromSideChain(WithdrawFromSideChain),
    TransferCrossChainAsset(TransferCrossChainAsset),
    RegisterProducer(ProducerInfo),
    CancelProducer(ProcessProducer),
    UpdateProducer(ProducerInfo),
    ReturnDepositCoin,
    ActivateProducer(ActivateProducer),
    IllegalProposalEvidence(DposIllegalProposals),
    IllegalVoteEvidence(DposIllegalVotes),
    IllegalBlockEvidence(DposIllegalBlocks),
    IllegalSidechainEvidence(SidechainIllegalData),
    InactiveArbitrators(InactiveArbitrators),
    UpdateVersion(UpdateVersion),
    NextTurnDPOSInfo(NextTurnDposInfo),
    RegisterCR(CrInfo),
    UnregisterCR(UnregisterCr),
    UpdateCR(CrInfo),
    ReturnCRDepositCoin,
    CRCProposal(Box<CrcProposal>),
    CRCProposalReview(CrcProposalReview),
    CRCProposalTracking(CrcProposalTracking),
    CRCAppropriation,
    CRCProposalWithdraw(CrcProposalWithdraw),
    CRCProposalRealWithdraw(CrcProposalRealWithdraw),
    CRAssetsRectify,
    CRCouncilMemberClaimNode(CrCouncilMemberClaimNode),
    RevertToPOW(RevertToPow),
    RevertToDPOS(RevertToDpos),
    ReturnSideChainDepositCoin,
    ExchangeVotes,
    Voting(Voting),
}

impl Default for Payload {
    fn default() -> Self {
        Payload::TransferAsset
    }
}

impl Payload {
    /// Returns the transaction type this payload belongs to.
    pub fn tx_type(&self) -> TxType {
        match self {
            Payload::CoinBase(_) => TxType::CoinBase,
            Payload::RegisterAsset(_) => TxType::RegisterAsset,
            Payload::TransferAsset => TxType::TransferAsset,
            Payload::Record(_) => TxType::Record,
            Payload::SideChainPow(_) => TxType::SideChainPow,
            Payload::WithdrawFromSideChain(_) => TxType::WithdrawFromSideChain,
            Payload::TransferCrossChainAsset(_) => TxType::TransferCrossChainAsset,
            Payload::RegisterProducer(_) => TxType::RegisterProducer,
            Payload::CancelProducer(_) => TxType::CancelProducer,
            Payload::UpdateProducer(_) => TxType::UpdateProducer,
            Payload::ReturnDepositCoin => TxType::ReturnDepositCoin,
            Payload::ActivateProducer(_) => TxType::ActivateProducer,
            Payload::IllegalProposalEvidence(_) => TxType::IllegalProposalEvidence,
            Payload::IllegalVoteEvidence(_) => TxType::IllegalVoteEvidence,
            Payload::IllegalBlockEvidence(_) => TxType::IllegalBlockEvidence,
            Payload::IllegalSidechainEvidence(_) => TxType::IllegalSidechainEvidence,
            Payload::InactiveArbitrators(_) => TxType::InactiveArbitrators,
            Payload::UpdateVersion(_) => TxType::UpdateVersion,
            Payload::NextTurnDPOSInfo(_) => TxType::NextTurnDPOSInfo,
            Payload::RegisterCR(_) => TxType::RegisterCR,
            Payload::UnregisterCR(_) => TxType::UnregisterCR,
            Payload::UpdateCR(_) => TxType::UpdateCR,
            Payload::ReturnCRDepositCoin => TxType::ReturnCRDepositCoin,
            Payload::CRCProposal(_) => TxType::CRCProposal,
            Payload::CRCProposalReview(_) => TxType::CRCProposalReview,
            Payload::CRCProposalTracking(_) => TxType::CRCProposalTracking,
            Payload::CRCAppropriation => TxType::CRCAppropriation,
            Payload::CRCProposalWithdraw(_) => TxType::CRCProposalWithdraw,
            Payload::CRCProposalRealWithdraw(_) => TxType::CRCProposalRealWithdraw,
            Payload::CRAssetsRectify => TxType::CRAssetsRectify,
            Payload::CRCouncilMemberClaimNode(_) => TxType::CRCouncilMemberClaimNode,
            Payload::RevertToPOW(_) => TxType::RevertToPOW,
            Payload::RevertToDPOS(_) => TxType::RevertToDPOS,
            Payload::ReturnSideChainDepositCoin => TxType::ReturnSideChainDepositCoin,
            Payload::ExchangeVotes => TxType::ExchangeVotes,
            Payload::Voting(_) => TxType::Voting,
        }
    }

    /// Returns the zero-valued payload of `tx_type`.
    pub fn default_for(tx_type: TxType) -> Payload {
        match tx_type {
            TxType::CoinBase => Payload::CoinBase(Default::default()),
            TxType::RegisterAsset => Payload::RegisterAsset(Default::default()),
            TxType::TransferAsset => Payload::TransferAsset,
            TxType::Record => Payload::Record(Default::default()),
            TxType::SideChainPow => Payload::SideChainPow(Default::default()),
            TxType::WithdrawFromSideChain => Payload::WithdrawFromSideChain(Default::default()),
            TxType::TransferCrossChainAsset => {
                Payload::TransferCrossChainAsset(Default::default())
            }
            TxType::RegisterProducer => Payload::RegisterProducer(Default::default()),
            TxType::CancelProducer => Payload::CancelProducer(Default::default()),
            TxType::UpdateProducer => Payload::UpdateProducer(Default::default()),
            TxType::ReturnDepositCoin => Payload::ReturnDepositCoin,
            TxType::ActivateProducer => Payload::ActivateProducer(Default::default()),
            TxType::IllegalProposalEvidence => {
                Payload::IllegalProposalEvidence(Default::default())
            }
            TxType::IllegalVoteEvidence => Payload::IllegalVoteEvidence(Default::default()),
            TxType::IllegalBlockEvidence => Payload::IllegalBlockEvidence(Default::default()),
            TxType::IllegalSidechainEvidence => {
                Payload::IllegalSidechainEvidence(Default::default())
            }
            TxType::InactiveArbitrators => Payload::InactiveArbitrators(Default::default()),
            TxType::UpdateVersion => Payload::UpdateVersion(Default::default()),
            TxType::NextTurnDPOSInfo => Payload::NextTurnDPOSInfo(Default::default()),
            TxType::RegisterCR => Payload::RegisterCR(Default::default()),
            TxType::UnregisterCR => Payload::UnregisterCR(Default::default()),
            TxType::UpdateCR => Payload::UpdateCR(Default::default()),
            TxType::ReturnCRDepositCoin => Payload::ReturnCRDepositCoin,
            TxType::CRCProposal => Payload::CRCProposal(Default::default()),
            TxType::CRCProposalReview => Payload::CRCProposalReview(Default::default()),
            TxType::CRCProposalTracking => Payload::CRCProposalTracking(Default::default()),
            TxType::CRCAppropriation => Payload::CRCAppropriation,
            TxType::CRCProposalWithdraw => Payload::CRCProposalWithdraw(Default::default()),
            TxType::CRCProposalRealWithdraw => {
                Payload::CRCProposalRealWithdraw(Default::default())
            }
            TxType::CRAssetsRectify => Payload::CRAssetsRectify,
            TxType::CRCouncilMemberClaimNode => {
                Payload::CRCouncilMemberClaimNode(Default::default())
            }
            TxType::RevertToPOW => Payload::RevertToPOW(Default::default()),
            TxType::RevertToDPOS => Payload::RevertToDPOS(Default::default()),
            TxType::ReturnSideChainDepositCoin => Payload::ReturnSideChainDepositCoin,
            TxType::ExchangeVotes => Payload::ExchangeVotes,
            TxType::Voting => Payload::Voting(Default::default()),
        }
    }

    /// Writes the payload in the layout of `version`.
    pub fn serialize<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        match self {
            Payload::TransferAsset
            | Payload::ReturnDepositCoin
            | Payload::ReturnCRDepositCoin
            | Payload::CRCAppropriation
            | Payload::CRAssetsRectify
            | Payload::ReturnSideChainDepositCoin
            | Payload::ExchangeVotes => Ok(()),

            Payload::CoinBase(p) => p.ela_serialize(&mut writer),
            Payload::RegisterAsset(p) => p.ela_serialize(&mut writer),
            Payload::Record(p) => p.ela_serialize(&mut writer),
            Payload::SideChainPow(p) => p.ela_serialize(&mut writer),
            Payload::WithdrawFromSideChain(p) => p.serialize(&mut writer, version),
            Payload::TransferCrossChainAsset(p) => p.serialize(&mut writer, version),
            Payload::RegisterProducer(p) | Payload::UpdateProducer(p) => {
                p.serialize(&mut writer, version)
            }
            Payload::CancelProducer(p) => p.ela_serialize(&mut writer),
            Payload::ActivateProducer(p) => p.ela_serialize(&mut writer),
            Payload::IllegalProposalEvidence(p) => p.ela_serialize(&mut writer),
            Payload::IllegalVoteEvidence(p) => p.ela_serialize(&mut writer),
            Payload::IllegalBlockEvidence(p) => p.ela_serialize(&mut writer),
            Payload::IllegalSidechainEvidence(p) => p.ela_serialize(&mut writer),
            Payload::InactiveArbitrators(p) => p.ela_serialize(&mut writer),
            Payload::UpdateVersion(p) => p.ela_serialize(&mut writer),
            Payload::NextTurnDPOSInfo(p) => p.serialize(&mut writer, version),
            Payload::RegisterCR(p) | Payload::UpdateCR(p) => p.serialize(&mut writer, version),
            Payload::UnregisterCR(p) => p.ela_serialize(&mut writer),
            Payload::CRCProposal(p) => p.serialize(&mut writer, version),
            Payload::CRCProposalReview(p) => p.serialize(&mut writer, version),
            Payload::CRCProposalTracking(p) => p.serialize(&mut writer, version),
            Payload::CRCProposalWithdraw(p) => p.serialize(&mut writer, version),
            Payload::CRCProposalRealWithdraw(p) => p.ela_serialize(&mut writer),
            Payload::CRCouncilMemberClaimNode(p) => p.ela_serialize(&mut writer),
            Payload::RevertToPOW(p) => p.ela_serialize(&mut writer),
            Payload::RevertToDPOS(p) => p.ela_serialize(&mut writer),
            Payload::Voting(p) => p.serialize(&mut writer, version),
        }
    }

    /// Reads the payload of a `tx_type` transaction in the layout of
    /// `version`.
    pub fn deserialize<R: io::Read>(
        mut reader: R,
        tx_type: TxType,
        version: u8,
    ) -> Result<Payload, SerializationError> {
        let reader = &mut reader;

        Ok(match tx_type {
            TxType::CoinBase => Payload::CoinBase(ElaDeserialize::ela_deserialize(reader)?),
            TxType::RegisterAsset => {
                Payload::RegisterAsset(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::TransferAsset => Payload::TransferAsset,
            TxType::Record => Payload::Record(ElaDeserialize::ela_deserialize(reader)?),
            TxType::SideChainPow => Payload::SideChainPow(ElaDeserialize::ela_deserialize(reader)?),
            TxType::WithdrawFromSideChain => {
                Payload::WithdrawFromSideChain(WithdrawFromSideChain::deserialize(reader, version)?)
            }
            TxType::TransferCrossChainAsset => Payload::TransferCrossChainAsset(
                TransferCrossChainAsset::deserialize(reader, version)?,
            ),
            TxType::RegisterProducer => {
                Payload::RegisterProducer(ProducerInfo::deserialize(reader, version)?)
            }
            TxType::CancelProducer => {
                Payload::CancelProducer(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::UpdateProducer => {
                Payload::UpdateProducer(ProducerInfo::deserialize(reader, version)?)
            }
            TxType::ReturnDepositCoin => Payload::ReturnDepositCoin,
            TxType::ActivateProducer => {
                Payload::ActivateProducer(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::IllegalProposalEvidence => {
                Payload::IllegalProposalEvidence(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::IllegalVoteEvidence => {
                Payload::IllegalVoteEvidence(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::IllegalBlockEvidence => {
                Payload::IllegalBlockEvidence(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::IllegalSidechainEvidence => {
                Payload::IllegalSidechainEvidence(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::InactiveArbitrators => {
                Payload::InactiveArbitrators(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::UpdateVersion => {
                Payload::UpdateVersion(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::NextTurnDPOSInfo => {
                Payload::NextTurnDPOSInfo(NextTurnDposInfo::deserialize(reader, version)?)
            }
            TxType::RegisterCR => Payload::RegisterCR(CrInfo::deserialize(reader, version)?),
            TxType::UnregisterCR => {
                Payload::UnregisterCR(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::UpdateCR => Payload::UpdateCR(CrInfo::deserialize(reader, version)?),
            TxType::ReturnCRDepositCoin => Payload::ReturnCRDepositCoin,
            TxType::CRCProposal => {
                Payload::CRCProposal(Box::new(CrcProposal::deserialize(reader, version)?))
            }
            TxType::CRCProposalReview => {
                Payload::CRCProposalReview(CrcProposalReview::deserialize(reader, version)?)
            }
            TxType::CRCProposalTracking => {
                Payload::CRCProposalTracking(CrcProposalTracking::deserialize(reader, version)?)
            }
            TxType::CRCAppropriation => Payload::CRCAppropriation,
            TxType::CRCProposalWithdraw => {
                Payload::CRCProposalWithdraw(CrcProposalWithdraw::deserialize(reader, version)?)
            }
            TxType::CRCProposalRealWithdraw => {
                Payload::CRCProposalRealWithdraw(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::CRAssetsRectify => Payload::CRAssetsRectify,
            TxType::CRCouncilMemberClaimNode => {
                Payload::CRCouncilMemberClaimNode(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::RevertToPOW => Payload::RevertToPOW(ElaDeserialize::ela_deserialize(reader)?),
            TxType::RevertToDPOS => {
                Payload::RevertToDPOS(ElaDeserialize::ela_deserialize(reader)?)
            }
            TxType::ReturnSideChainDepositCoin => Payload::ReturnSideChainDepositCoin,
            TxType::ExchangeVotes => Payload::ExchangeVotes,
            TxType::Voting => Payload::Voting(Voting::deserialize(reader, version)?),
        })
    }

    /// Returns the side-chain transaction hashes listed by this payload.
    pub fn side_chain_transaction_hashes(&self) -> &[crate::Hash] {
        match self {
            Payload::WithdrawFromSideChain(p) => &p.side_chain_transaction_hashes,
            _ => &[],
        }
    }
}

/// Writes a var-uint count followed by each item as var-bytes.
pub(crate) fn write_var_bytes_list<W: io::Write>(
    mut writer: W,
    list: &[Vec<u8>],
) -> io::Result<()> {
    writer.write_var_uint(list.len() as u64)?;
    for item in list {
        writer.write_var_bytes(item)?;
    }
    Ok(())
}

/// Reads a list written by [`write_var_bytes_list`].
pub(crate) fn read_var_bytes_list<R: io::Read>(
    mut reader: R,
) -> Result<Vec<Vec<u8>>, SerializationError> {
    let count = reader.read_var_uint()?;
    if count > max_items_for_size(1) {
        return Err(SerializationError::Parse("too many byte strings"));
    }

    let mut list = Vec::with_capacity(count as usize);
    for _ in 0..count {
        list.push(reader.read_var_bytes()?);
    }
    Ok(list)
}
