//! Transaction version and type tags.

use std::fmt;

/// The leading header byte of a versioned transaction has this bit set.
pub const VERSIONED_FLAG: u8 = 0x80;

/// A transaction serialization version.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TxVersion {
    /// Legacy transactions, whose header is a single type byte.
    #[default]
    Default = 0x00,

    /// Transactions whose outputs carry a type and a payload.
    V09 = 0x09,
}

impl TxVersion {
    /// Returns the version with the given number, if it is known.
    pub fn from_u8(version: u8) -> Option<TxVersion> {
        match version {
            0x00 => Some(TxVersion::Default),
            0x09 => Some(TxVersion::V09),
            _ => None,
        }
    }

    /// Returns `true` if outputs are typed in this version.
    pub fn has_output_types(&self) -> bool {
        *self >= TxVersion::V09
    }
}

macro_rules! tx_types {
    ($($(#[$doc:meta])* $variant:ident = $tag:literal,)*) => {
        /// The one-byte tag selecting a transaction's payload and rules.
        #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum TxType {
            $($(#[$doc])* $variant = $tag,)*
        }

        impl TxType {
            /// Every transaction type, in tag order.
            pub const ALL: &'static [TxType] = &[$(TxType::$variant,)*];

            /// Returns the type with the given tag, if it is known.
            pub fn from_u8(tag: u8) -> Option<TxType> {
                match tag {
                    $($tag => Some(TxType::$variant),)*
                    _ => None,
                }
            }

            /// Returns the name of this type.
            pub fn name(&self) -> &'static str {
                match self {
                    $(TxType::$variant => stringify!($variant),)*
                }
            }
        }
    };
}

tx_types! {
    /// Block rewards.
    #[default]
    CoinBase = 0x00,
    /// Registers a new asset.
    RegisterAsset = 0x01,
    /// An ordinary transfer.
    TransferAsset = 0x02,
    /// Records arbitrary data.
    Record = 0x03,
    /// Side-chain proof of work anchored on the main chain.
    SideChainPow = 0x05,
    /// Pays out side-chain withdrawals.
    WithdrawFromSideChain = 0x07,
    /// Sends assets to a side chain.
    TransferCrossChainAsset = 0x08,
    /// Registers a block producer.
    RegisterProducer = 0x09,
    /// Cancels a block producer.
    CancelProducer = 0x0a,
    /// Updates a block producer's details.
    UpdateProducer = 0x0b,
    /// Returns a producer deposit.
    ReturnDepositCoin = 0x0c,
    /// Reactivates an inactive producer.
    ActivateProducer = 0x0d,
    /// Evidence that a sponsor proposed two blocks at one height.
    IllegalProposalEvidence = 0x0e,
    /// Evidence that an arbitrator voted twice at one height.
    IllegalVoteEvidence = 0x0f,
    /// Evidence of two confirmed blocks at one height.
    IllegalBlockEvidence = 0x10,
    /// Evidence of side-chain misbehaviour.
    IllegalSidechainEvidence = 0x11,
    /// Marks arbitrators as inactive.
    InactiveArbitrators = 0x12,
    /// Announces a node software version window.
    UpdateVersion = 0x13,
    /// Announces the next turn's arbitrators.
    NextTurnDPOSInfo = 0x14,
    /// Registers a CR candidate.
    RegisterCR = 0x21,
    /// Unregisters a CR candidate.
    UnregisterCR = 0x22,
    /// Updates a CR candidate's details.
    UpdateCR = 0x23,
    /// Returns a CR deposit.
    ReturnCRDepositCoin = 0x24,
    /// Submits a CR proposal.
    CRCProposal = 0x25,
    /// A council member's review of a proposal.
    CRCProposalReview = 0x26,
    /// Tracks a proposal's progress.
    CRCProposalTracking = 0x27,
    /// Moves the committee's budget to the expenses address.
    CRCAppropriation = 0x28,
    /// Withdraws a proposal budget.
    CRCProposalWithdraw = 0x29,
    /// Pays out recorded proposal withdrawals.
    CRCProposalRealWithdraw = 0x2a,
    /// Consolidates the CR assets address.
    CRAssetsRectify = 0x2b,
    /// A council member claims a DPoS node key.
    CRCouncilMemberClaimNode = 0x31,
    /// Switches consensus to proof of work.
    RevertToPOW = 0x41,
    /// Switches consensus back to DPoS.
    RevertToDPOS = 0x42,
    /// Returns side-chain deposits.
    ReturnSideChainDepositCoin = 0x51,
    /// Exchanges ELA into DPoS v2 votes.
    ExchangeVotes = 0x62,
    /// Casts DPoS v2 votes.
    Voting = 0x63,
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
