#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod errors;
pub use errors::ProverError;

mod config;
pub use config::Config;

mod races;

mod contracts;
pub use contracts::{ResolvedAddresses, resolve_addresses};

mod handles;
pub use handles::{
    BytecodeDeployer, ManagedAccount, StateManagerHandle, TransitionPhase, TransitionerHandle,
    VerifierHandle,
};

mod verifier;
pub use verifier::AlloyVerifier;

mod deployer;
pub use deployer::{CodeDeployer, DEPLOY_CODE_PREFIX, EMPTY_CODE_CARRIER, carrier_init_code};

mod witness;
pub use witness::{FraudProofData, assemble};

mod phase;
pub use phase::PhaseDriver;

mod scanner;
pub use scanner::Scanner;

mod service;
pub use service::{Prover, probe_endpoints};
