use anchor_carrier::{
    wrap_annex, wrap_inscription, wrap_op_return, wrap_stamps, wrap_witness_data,
};
use anchor_msg_fmt::{AnchorRef, encode_payload};
use anyhow::Context;
use clap::{Args, ValueEnum};
use tracing::*;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum Carrier {
    OpReturn,
    Inscription,
    Stamps,
    Annex,
    WitnessData,
}

#[derive(Debug, Args)]
pub(crate) struct Encode {
    /// Message kind byte, 1 for text and 4 for images.
    #[arg(long)]
    kind: u8,

    /// Reference to a parent output as `<16 hex digit txid prefix>:<vout>`.
    /// The first one given is the canonical parent.
    #[arg(long = "anchor", value_name = "TXIDPREFIX:VOUT")]
    anchors: Vec<AnchorRef>,

    /// UTF-8 body.
    #[arg(long, conflicts_with = "body_hex", required_unless_present = "body_hex")]
    text: Option<String>,

    /// Hex encoded body.
    #[arg(long)]
    body_hex: Option<String>,

    /// How to embed the payload.
    #[arg(long, value_enum)]
    carrier: Carrier,

    /// Content type for inscriptions.
    #[arg(long, default_value = "text/plain;charset=utf-8")]
    content_type: String,
}

impl Encode {
    pub(crate) fn run(self) -> anyhow::Result<()> {
        let bytes = self.carrier_bytes()?;
        println!("{}", hex::encode(bytes));
        Ok(())
    }

    fn body(&self) -> anyhow::Result<Vec<u8>> {
        match (&self.text, &self.body_hex) {
            (Some(text), _) => Ok(text.as_bytes().to_vec()),
            (None, Some(h)) => hex::decode(h.trim()).context("decoding --body-hex"),
            (None, None) => Ok(Vec::new()),
        }
    }

    fn carrier_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let body = self.body()?;
        let payload = encode_payload(self.kind, &self.anchors, &body)?;
        debug!(
            kind = self.kind,
            anchors = self.anchors.len(),
            len = payload.len(),
            carrier = ?self.carrier,
            "encoded payload"
        );

        let bytes = match self.carrier {
            Carrier::OpReturn => wrap_op_return(&payload)?.into_bytes(),
            Carrier::Inscription => {
                wrap_inscription(&payload, self.content_type.as_bytes())?
                    .into_script()
                    .into_bytes()
            }
            Carrier::Stamps => wrap_stamps(&payload)?.into_bytes(),
            Carrier::Annex => wrap_annex(&payload),
            Carrier::WitnessData => wrap_witness_data(&payload)?.into_bytes(),
        };

        Ok(bytes)
    }
}
