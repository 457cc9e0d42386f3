use alloy_primitives::U256;
use ssz_derive::{Decode, Encode};
use ssz_types::{typenum::U32, typenum::U256 as BytesPerLogsBloom, FixedVector, VariableList};

use crate::phase0::primitives::{
    ExecutionAddress, ExecutionBlockHash, ExecutionBlockNumber, Gwei, H256,
};

#[derive(Clone, PartialEq, Default, Debug, Encode, Decode)]
pub struct ExecutionPayloadHeader {
    pub parent_hash: ExecutionBlockHash,
    pub fee_recipient: ExecutionAddress,
    pub state_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: FixedVector<u8, BytesPerLogsBloom>,
    pub prev_randao: H256,
    pub block_number: ExecutionBlockNumber,
    pub gas_limit: Gwei,
    pub gas_used: Gwei,
    pub timestamp: u64,
    pub extra_data: VariableList<u8, U32>,
    pub base_fee_per_gas: U256,
    pub block_hash: ExecutionBlockHash,
    pub transactions_root: H256,
}
