use std::fmt;

/// Mechanism a payload was embedded with.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CarrierKind {
    /// `OP_RETURN` output.
    OpReturn,

    /// Tapscript inscription envelope.
    Inscription,

    /// Fake-pubkey bare multisig output.
    Stamps,

    /// Taproot annex.
    TaprootAnnex,

    /// Raw witness push.
    WitnessData,

    /// Not a carrier.
    None,
}

/// Where in a transaction a carrier lives.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CarrierLocation {
    /// An output's `scriptPubKey`.
    OutputScript,

    /// An item of an input's witness stack.
    WitnessItem,
}

impl CarrierKind {
    /// Returns where carriers of this kind are found, `None` for
    /// [`CarrierKind::None`].
    pub fn location(self) -> Option<CarrierLocation> {
        match self {
            Self::OpReturn | Self::Stamps => Some(CarrierLocation::OutputScript),
            Self::Inscription | Self::TaprootAnnex | Self::WitnessData => {
                Some(CarrierLocation::WitnessItem)
            }
            Self::None => None,
        }
    }

    /// Checks if this is an actual carrier.
    pub fn is_carrier(self) -> bool {
        self != Self::None
    }

    /// Short human readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::OpReturn => "OP_RETURN",
            Self::Inscription => "Inscription",
            Self::Stamps => "Stamps",
            Self::TaprootAnnex => "Taproot annex",
            Self::WitnessData => "Witness data",
            Self::None => "None",
        }
    }
}

impl fmt::Display for CarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
