#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod errors;
pub use errors::ViewError;

mod traits;
pub use traits::{RollupView, SettlementView};

mod settlement;
pub use settlement::{AlloySettlementView, CanonicalTransactionChain, StateCommitmentChain};

mod rollup;
pub use rollup::AlloyRollupView;
