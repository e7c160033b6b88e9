/// Definition of an EVM network the chat contract can be deployed to.
#[derive(Debug, Clone)]
pub struct EvmChain {
    pub chain_id: u64,
    pub name: &'static str,
    pub rpc_url: &'static str,
    pub is_testnet: bool,
}

/// Hardhat / Anvil development node (chain ID 31337).
pub const HARDHAT_LOCAL: EvmChain = EvmChain {
    chain_id: 31337,
    name: "Hardhat Local",
    rpc_url: "http://127.0.0.1:8545",
    is_testnet: true,
};

/// Holesky Testnet (chain ID 17000).
pub const HOLESKY: EvmChain = EvmChain {
    chain_id: 17000,
    name: "Holesky",
    rpc_url: "https://ethereum-holesky-rpc.publicnode.com",
    is_testnet: true,
};

/// Sepolia Testnet (chain ID 11155111).
pub const SEPOLIA: EvmChain = EvmChain {
    chain_id: 11155111,
    name: "Sepolia",
    rpc_url: "https://rpc.sepolia.org",
    is_testnet: true,
};

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: EvmChain = EvmChain {
    chain_id: 1,
    name: "Ethereum",
    rpc_url: "https://eth.llamarpc.com",
    is_testnet: false,
};

const ALL_CHAINS: &[&EvmChain] = &[&HARDHAT_LOCAL, &HOLESKY, &SEPOLIA, &ETHEREUM];

/// Returns the chain definition for a given chain ID, or `None` if unknown.
pub fn get_chain(chain_id: u64) -> Option<&'static EvmChain> {
    ALL_CHAINS.iter().find(|c| c.chain_id == chain_id).copied()
}
