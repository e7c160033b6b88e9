use std::sync::Arc;

use chain_eth::abi::{decode, encode_function_call, Token};
use wallet_provider::{PendingTransaction, Signer, TransactionReceipt};

use crate::error::ContractError;
use crate::interface::{ContractInterface, Function};

/// A deployed contract bound to a signer: the callable proxy for its
/// remote operations.
#[derive(Debug, Clone)]
pub struct Contract {
    address: String,
    interface: Arc<ContractInterface>,
    signer: Signer,
}

impl Contract {
    pub fn new(
        address: &str,
        interface: Arc<ContractInterface>,
        signer: Signer,
    ) -> Result<Self, ContractError> {
        let bytes = chain_eth::address::parse_address(address)?;
        Ok(Self {
            address: chain_eth::address::format_address(&bytes),
            interface,
            signer,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Runs a read-only function and returns its decoded outputs.
    pub async fn query(&self, name: &str, args: &[Token]) -> Result<Vec<Token>, ContractError> {
        let function = self.interface.function(name)?;
        if !function.is_query() {
            return Err(ContractError::NotAQuery(name.to_string()));
        }
        let data = encode_call(function, args)?;

        tracing::debug!(function = %function.signature(), contract = %self.address, "query");

        let output = self.signer.call(&self.address, &data).await?;
        Ok(decode(&function.outputs, &output)?)
    }

    /// Submits a state-changing function without waiting for it to be mined.
    pub async fn submit(
        &self,
        name: &str,
        args: &[Token],
    ) -> Result<PendingTransaction, ContractError> {
        let function = self.interface.function(name)?;
        if function.is_query() {
            return Err(ContractError::NotATransaction(name.to_string()));
        }
        let data = encode_call(function, args)?;

        tracing::debug!(function = %function.signature(), contract = %self.address, "submit");

        Ok(self.signer.send_transaction(&self.address, &data).await?)
    }

    /// Submits a state-changing function and waits until it is mined.
    pub async fn transact(
        &self,
        name: &str,
        args: &[Token],
    ) -> Result<TransactionReceipt, ContractError> {
        let pending = self.submit(name, args).await?;
        Ok(pending.wait().await?)
    }
}

/// Checks arguments against the function's inputs and encodes the call.
fn encode_call(function: &Function, args: &[Token]) -> Result<Vec<u8>, ContractError> {
    if args.len() != function.inputs.len() {
        return Err(ContractError::ArgumentCount {
            function: function.name.clone(),
            expected: function.inputs.len(),
            got: args.len(),
        });
    }
    if let Some(index) = function
        .inputs
        .iter()
        .zip(args)
        .position(|(ty, token)| !ty.matches(token))
    {
        return Err(ContractError::ArgumentType {
            function: function.name.clone(),
            index,
            expected: function.inputs[index].canonical(),
        });
    }
    Ok(encode_function_call(function.selector(), args))
}
