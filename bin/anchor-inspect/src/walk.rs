use std::io::{self, Read};

use anyhow::{Context, bail};
use clap::Args;
use serde_json::json;

#[derive(Debug, Args)]
pub(crate) struct Walk {
    /// Raw transaction hex, or `-` to read it from stdin.
    #[arg(value_name = "HEX|-")]
    tx: String,
}

impl Walk {
    pub(crate) fn run(self) -> anyhow::Result<()> {
        let hex = if self.tx == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading transaction from stdin")?;
            buf
        } else {
            self.tx
        };

        match anchor_tx_walker::walk_tx_hex(&hex) {
            Ok(layout) => {
                println!("{}", serde_json::to_string_pretty(&layout)?);
                Ok(())
            }
            Err(partial) => {
                let (layout, error) = partial.into_parts();
                let out = json!({
                    "error": error.to_string(),
                    "partial": layout,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                bail!("failed to walk transaction: {error}")
            }
        }
    }
}
